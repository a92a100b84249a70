//! Seed reading functionality
//!
//! The seed is used verbatim: nothing is trimmed, so a trailing newline in a
//! seed file is part of the seed.

use crate::error::{ErrorCategory, ErrorKind, PolybiusError, Result};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

/// Trait for reading seeds from various sources
pub trait SeedSource {
    /// Read the seed text.
    ///
    /// Returns the seed wrapped in `Zeroizing` so it is wiped from memory
    /// when dropped.
    fn read_seed(&mut self) -> Result<Zeroizing<String>>;
}

/// Returns a fixed seed
pub struct ConstantSeedSource {
    seed: Zeroizing<String>,
}

impl ConstantSeedSource {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: Zeroizing::new(seed.into()),
        }
    }
}

impl SeedSource for ConstantSeedSource {
    fn read_seed(&mut self) -> Result<Zeroizing<String>> {
        Ok(Zeroizing::new((*self.seed).clone()))
    }
}

/// Reads the whole content of a UTF-8 seed file
pub struct FileSeedSource {
    path: PathBuf,
}

impl FileSeedSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SeedSource for FileSeedSource {
    fn read_seed(&mut self) -> Result<Zeroizing<String>> {
        let bytes = fs::read(&self.path).map_err(|e| unavailable(&self.path, e))?;
        let seed = String::from_utf8(bytes).map_err(|e| unavailable(&self.path, e.utf8_error()))?;
        Ok(Zeroizing::new(seed))
    }
}

/// Reads a UTF-8 seed from any io::Read source
pub struct ReaderSeedSource {
    reader: Box<dyn Read>,
}

impl ReaderSeedSource {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self { reader }
    }
}

impl SeedSource for ReaderSeedSource {
    fn read_seed(&mut self) -> Result<Zeroizing<String>> {
        let mut data = Zeroizing::new(String::new());
        self.reader.read_to_string(&mut data).map_err(|e| {
            PolybiusError::with_kind_and_source(
                ErrorCategory::User,
                ErrorKind::SeedSourceUnavailable,
                format!("error reading seed: {}", e),
                e,
            )
        })?;
        Ok(data)
    }
}

fn unavailable(
    path: &Path,
    err: impl std::error::Error + Send + Sync + 'static,
) -> PolybiusError {
    PolybiusError::with_kind_and_source(
        ErrorCategory::User,
        ErrorKind::SeedSourceUnavailable,
        format!("cannot open {}", path.display()),
        err,
    )
}
