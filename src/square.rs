//! Seed-keyed Polybius square generation and its coordinate index
//!
//! A square of dimension `N` holds every integer in `0..N*N` exactly once,
//! laid out row-major in an order fully determined by the seed. The layout
//! is reproduced bit-for-bit from the seed as follows:
//!
//! - the seed's UTF-8 bytes are followed by their SHA-512 digest, and the
//!   result is read as one big-endian integer
//! - that integer is split into 32-bit words, least significant first, and
//!   used as the `init_by_array` key of an MT19937 generator
//! - `0..N*N` is Fisher-Yates shuffled from the last position down, each
//!   swap partner drawn with [`Mt19937::below`]
//!
//! Any implementation that follows the same steps produces the same square.

use crate::error::{ErrorCategory, ErrorKind, PolybiusError, Result};
use crate::mt19937::Mt19937;
use sha2::{Digest, Sha512};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;
use zeroize::Zeroizing;

/// Default square dimension; 16 x 16 covers every byte value.
pub const DEFAULT_DIMENSION: usize = 16;

/// A square grid holding a permutation of `0..dimension²`.
#[derive(Clone, PartialEq, Eq)]
pub struct Square {
    dimension: usize,
    cells: Vec<usize>,
}

impl Square {
    /// Builds a square from explicit rows.
    ///
    /// The rows must be non-empty and all as long as there are rows. Whether
    /// the cells form a permutation is left to the caller; a square that
    /// misses some values simply cannot encrypt them.
    pub fn from_rows(rows: Vec<Vec<usize>>) -> Result<Self> {
        let dimension = rows.len();
        if dimension == 0 {
            return Err(PolybiusError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidParameter,
                "square must have at least one row",
            ));
        }
        if let Some((row, cells)) = rows.iter().enumerate().find(|(_, r)| r.len() != dimension) {
            return Err(PolybiusError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidParameter,
                format!(
                    "row {} has {} columns, expected {}",
                    row,
                    cells.len(),
                    dimension
                ),
            ));
        }
        Ok(Self {
            dimension,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of rows (and of columns).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Value at `(row, column)`, or `None` outside the grid.
    pub fn get(&self, row: usize, column: usize) -> Option<usize> {
        if row >= self.dimension || column >= self.dimension {
            return None;
        }
        Some(self.cells[row * self.dimension + column])
    }

    /// Iterates over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[usize]> {
        self.cells.chunks_exact(self.dimension)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    /// Copies the square out as a vector of rows.
    pub fn to_rows(&self) -> Vec<Vec<usize>> {
        self.rows().map(<[usize]>::to_vec).collect()
    }
}

// The square is the key; keep it out of debug output.
impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Square")
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

/// Generates the square for `seed` with `dimension` rows and columns.
///
/// Fails only when `dimension` is zero or the `dimension²` cells cannot be
/// allocated.
pub fn generate_square(dimension: usize, seed: &str) -> Result<Square> {
    if dimension == 0 {
        return Err(PolybiusError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidParameter,
            "square dimension must be at least 1",
        ));
    }
    let size = dimension.checked_mul(dimension).ok_or_else(|| {
        PolybiusError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidParameter,
            format!("square dimension {} is too large", dimension),
        )
    })?;

    let key = seed_key(seed);
    let mut rng = Mt19937::from_key(&key);

    let mut cells: Vec<usize> = Vec::new();
    cells.try_reserve_exact(size).map_err(|e| {
        PolybiusError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::InvalidParameter,
            format!("square dimension {} is too large", dimension),
            e,
        )
    })?;
    cells.extend(0..size);
    for i in (1..size).rev() {
        let j = rng.below(i as u64 + 1) as usize;
        cells.swap(i, j);
    }
    debug!(dimension, "generated square");

    Ok(Square { dimension, cells })
}

/// Derives the MT19937 key words for a seed string.
fn seed_key(seed: &str) -> Zeroizing<Vec<u32>> {
    let mut material = Zeroizing::new(Vec::with_capacity(seed.len() + 64));
    material.extend_from_slice(seed.as_bytes());
    material.extend_from_slice(&Sha512::digest(seed.as_bytes()));

    // Big-endian integer -> little-endian bytes, without high zero bytes.
    material.reverse();
    let significant = material
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |pos| pos + 1);
    material.truncate(significant);

    let mut key = Zeroizing::new(Vec::with_capacity(significant.div_ceil(4).max(1)));
    for chunk in material.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        key.push(u32::from_le_bytes(word));
    }
    if key.is_empty() {
        key.push(0);
    }
    key
}

/// Position of a value inside a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub row: usize,
    pub column: usize,
}

/// Inverse of a square: value -> position.
#[derive(Clone, Default)]
pub struct CoordinateIndex {
    positions: HashMap<usize, Coordinate>,
}

impl fmt::Debug for CoordinateIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinateIndex")
            .field("len", &self.positions.len())
            .finish_non_exhaustive()
    }
}

impl CoordinateIndex {
    pub fn get(&self, value: usize) -> Option<Coordinate> {
        self.positions.get(&value).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Coordinate)> + '_ {
        self.positions.iter().map(|(&value, &coord)| (value, coord))
    }
}

impl From<&Square> for CoordinateIndex {
    fn from(square: &Square) -> Self {
        build_index(square)
    }
}

/// Maps every value in `square` to its `(row, column)`.
///
/// For a square that repeats a value, the last occurrence in row-major order
/// wins.
pub fn build_index(square: &Square) -> CoordinateIndex {
    let mut positions = HashMap::with_capacity(square.cells.len());
    for (row, cells) in square.rows().enumerate() {
        for (column, &value) in cells.iter().enumerate() {
            positions.insert(value, Coordinate { row, column });
        }
    }
    CoordinateIndex { positions }
}
