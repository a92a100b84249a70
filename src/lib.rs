//! Polybius - seed-keyed Polybius square file cipher
//!
//! Bytes are mapped to `(row, column)` positions in a square whose layout is
//! shuffled from a seed string, and written as fixed-width decimal digits.
//! This is a classical substitution cipher; it offers no confidentiality
//! against anyone who can guess or recover the square.

#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod file_ops;
pub mod mode;
pub mod mt19937;
pub mod seed;
pub mod square;

pub use codec::{CipherParams, Codec, DEFAULT_COORDINATE_SIZE, decrypt, encrypt};
pub use error::{ErrorCategory, ErrorKind, PolybiusError, Result};
pub use mode::Mode;
pub use square::{
    Coordinate, CoordinateIndex, DEFAULT_DIMENSION, Square, build_index, generate_square,
};
