//! File encryption/decryption operations
//!
//! Reads the seed, builds the square, transforms the input file and writes
//! the result. Ciphertext files are UTF-8 digit text; plaintext files are raw
//! bytes. Output is staged in a temporary file next to the target and only
//! renamed into place once the whole transformation succeeded, so a failed
//! run never leaves partial output behind.

use crate::codec::{CipherParams, Codec};
use crate::error::{ErrorCategory, ErrorKind, PolybiusError, Result};
use crate::mode::Mode;
use crate::seed::SeedSource;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

/// Run `mode` from `input_path` to `output_path`.
pub fn run(
    mode: Mode,
    input_path: &Path,
    output_path: &Path,
    seed_source: &mut dyn SeedSource,
    params: &CipherParams,
) -> Result<()> {
    match mode {
        Mode::Encrypt => encrypt_file(input_path, output_path, seed_source, params),
        Mode::Decrypt => decrypt_file(input_path, output_path, seed_source, params),
    }
}

/// Encrypt a file
///
/// Reads raw bytes from `input_path` and writes the digit ciphertext to
/// `output_path`.
pub fn encrypt_file(
    input_path: &Path,
    output_path: &Path,
    seed_source: &mut dyn SeedSource,
    params: &CipherParams,
) -> Result<()> {
    let codec = load_codec(seed_source, params)?;
    let plaintext = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    info!(input = %input_path.display(), bytes = plaintext.len(), "encrypting");

    let ciphertext = codec
        .encrypt(&plaintext)
        .map_err(|e| e.with_context("encryption failed"))?;
    write_file_atomic(output_path, ciphertext.as_bytes())
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;
    debug!(output = %output_path.display(), chars = ciphertext.len(), "wrote ciphertext");
    Ok(())
}

/// Decrypt a file
///
/// Reads UTF-8 digit text from `input_path` and writes the recovered bytes
/// to `output_path`.
pub fn decrypt_file(
    input_path: &Path,
    output_path: &Path,
    seed_source: &mut dyn SeedSource,
    params: &CipherParams,
) -> Result<()> {
    let codec = load_codec(seed_source, params)?;
    let encrypted_bytes = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let encrypted = String::from_utf8(encrypted_bytes).map_err(|e| {
        PolybiusError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            "input file is not valid UTF-8",
            e,
        )
    })?;
    info!(input = %input_path.display(), chars = encrypted.len(), "decrypting");

    let plaintext = codec
        .decrypt(&encrypted)
        .map_err(|e| e.with_context("decryption failed"))?;
    write_file_atomic(output_path, &plaintext)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;
    debug!(output = %output_path.display(), bytes = plaintext.len(), "wrote plaintext");
    Ok(())
}

fn load_codec(seed_source: &mut dyn SeedSource, params: &CipherParams) -> Result<Codec> {
    let seed = seed_source.read_seed()?;
    params.codec(&seed)
}

/// Write `contents` to `path` via tempfile + fsync + rename.
///
/// The file is created with mode 0o600 on Unix systems.
fn write_file_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp_file = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        PolybiusError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("failed to create tempfile in {}", dir.display()),
            e,
        )
    })?;

    temp_file.write_all(contents).map_err(|e| {
        PolybiusError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to write to tempfile",
            e,
        )
    })?;
    temp_file.flush().map_err(|e| {
        PolybiusError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to flush tempfile",
            e,
        )
    })?;
    temp_file.as_file().sync_all().map_err(|e| {
        PolybiusError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to sync file prior to rename",
            e,
        )
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp_file
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| {
                PolybiusError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    "failed to set tempfile permissions",
                    e,
                )
            })?;
    }

    temp_file.persist(path).map_err(|e| {
        PolybiusError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Io,
            format!("failed to rename to target file {}", path.display()),
            e,
        )
    })?;
    Ok(())
}

fn read_error(path: &Path, err: io::Error) -> PolybiusError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    PolybiusError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}
