//! Polybius encryption and decryption
//!
//! Every plaintext byte becomes two fixed-width decimal fields, the row and
//! the column of that byte in the square. With the default 16 x 16 square and
//! two-digit fields the ciphertext is four ASCII digits per byte.
//!
//! Field formatting never fails: a coordinate wider than the field keeps only
//! its last `coordinate_size` digits. Distinct coordinates can then collide,
//! so round trips are only guaranteed while `dimension <= 10^coordinate_size`.

use crate::error::{ErrorCategory, ErrorKind, PolybiusError, Result};
use crate::square::{CoordinateIndex, DEFAULT_DIMENSION, Square, build_index, generate_square};

/// Default number of digits per row or column field.
pub const DEFAULT_COORDINATE_SIZE: usize = 2;

/// Square and field parameters shared by both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherParams {
    pub dimension: usize,
    pub coordinate_size: usize,
}

impl Default for CipherParams {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            coordinate_size: DEFAULT_COORDINATE_SIZE,
        }
    }
}

impl CipherParams {
    /// Generates the square for `seed` and binds it into a codec.
    pub fn codec(&self, seed: &str) -> Result<Codec> {
        let square = generate_square(self.dimension, seed)?;
        Codec::with_coordinate_size(square, self.coordinate_size)
    }
}

/// A square together with its coordinate index and field width.
#[derive(Debug, Clone)]
pub struct Codec {
    square: Square,
    index: CoordinateIndex,
    coordinate_size: usize,
}

impl Codec {
    /// Codec using the default field width.
    pub fn new(square: Square) -> Self {
        let index = build_index(&square);
        Self {
            square,
            index,
            coordinate_size: DEFAULT_COORDINATE_SIZE,
        }
    }

    pub fn with_coordinate_size(square: Square, coordinate_size: usize) -> Result<Self> {
        check_coordinate_size(coordinate_size)?;
        let index = build_index(&square);
        Ok(Self {
            square,
            index,
            coordinate_size,
        })
    }

    pub fn square(&self) -> &Square {
        &self.square
    }

    pub fn coordinate_size(&self) -> usize {
        self.coordinate_size
    }

    /// Encrypts `bytes` into `len(bytes) * 2 * coordinate_size` digits.
    ///
    /// Fails with `InvalidParameter` when the ciphertext would not fit in
    /// memory.
    pub fn encrypt(&self, bytes: &[u8]) -> Result<String> {
        let too_large = || {
            PolybiusError::with_kind(
                ErrorCategory::User,
                ErrorKind::InvalidParameter,
                format!(
                    "ciphertext for {} bytes with coordinate size {} is too large",
                    bytes.len(),
                    self.coordinate_size
                ),
            )
        };
        let capacity = bytes
            .len()
            .checked_mul(2 * self.coordinate_size)
            .ok_or_else(too_large)?;
        let mut encrypted = String::new();
        encrypted
            .try_reserve_exact(capacity)
            .map_err(|_| too_large())?;
        for &byte in bytes {
            let coord = self.index.get(usize::from(byte)).ok_or_else(|| {
                PolybiusError::with_kind(
                    ErrorCategory::User,
                    ErrorKind::UnknownSymbol,
                    format!("unknown symbol {}", byte),
                )
            })?;
            push_field(&mut encrypted, coord.row, self.coordinate_size);
            push_field(&mut encrypted, coord.column, self.coordinate_size);
        }
        Ok(encrypted)
    }

    /// Decrypts digit text produced by [`Codec::encrypt`].
    ///
    /// Fields are cut by characters. Each field may carry surrounding
    /// whitespace or a sign; a negative coordinate is reported as out of
    /// range. Recovered values are emitted as their low 8 bits.
    pub fn decrypt(&self, text: &str) -> Result<Vec<u8>> {
        let size = self.coordinate_size;
        let chunk_len = size * 2;
        let chars: Vec<char> = text.chars().collect();
        if chars.len() % chunk_len != 0 {
            return Err(PolybiusError::with_kind(
                ErrorCategory::User,
                ErrorKind::MalformedLength,
                format!("encrypted text length must be divisible by {}", chunk_len),
            ));
        }

        let dimension = self.square.dimension();
        let mut decrypted = Vec::with_capacity(chars.len() / chunk_len);
        for chunk in chars.chunks_exact(chunk_len) {
            let row = parse_field(&chunk[..size])?;
            let column = parse_field(&chunk[size..])?;

            let value = in_range(row, dimension)
                .zip(in_range(column, dimension))
                .and_then(|(row, column)| self.square.get(row, column))
                .ok_or_else(|| {
                    PolybiusError::with_kind(
                        ErrorCategory::User,
                        ErrorKind::OutOfRange,
                        format!(
                            "row {} or column {} out of range 0..{}",
                            row, column, dimension
                        ),
                    )
                })?;
            decrypted.push(value as u8);
        }
        Ok(decrypted)
    }
}

/// Encrypts `bytes` with `square` using two-digit fields.
pub fn encrypt(bytes: &[u8], square: &Square) -> Result<String> {
    Codec::new(square.clone()).encrypt(bytes)
}

/// Decrypts `text` with `square` using `coordinate_size`-digit fields.
pub fn decrypt(text: &str, square: &Square, coordinate_size: usize) -> Result<Vec<u8>> {
    Codec::with_coordinate_size(square.clone(), coordinate_size)?.decrypt(text)
}

/// A width is usable when it is non-zero and a row/column pair of fields
/// still has a representable length.
fn check_coordinate_size(coordinate_size: usize) -> Result<()> {
    if coordinate_size == 0 {
        return Err(PolybiusError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidParameter,
            "coordinate size must be at least 1",
        ));
    }
    if coordinate_size.checked_mul(2).is_none() {
        return Err(PolybiusError::with_kind(
            ErrorCategory::User,
            ErrorKind::InvalidParameter,
            format!("coordinate size {} is too large", coordinate_size),
        ));
    }
    Ok(())
}

/// Appends `value` zero-padded to `size` digits, keeping only the last
/// `size` digits when it is wider.
fn push_field(out: &mut String, value: usize, size: usize) {
    let digits = value.to_string();
    if digits.len() >= size {
        out.push_str(&digits[digits.len() - size..]);
    } else {
        out.extend(std::iter::repeat_n('0', size - digits.len()));
        out.push_str(&digits);
    }
}

fn parse_field(field: &[char]) -> Result<i64> {
    let text: String = field.iter().collect();
    text.trim().parse::<i64>().map_err(|e| {
        PolybiusError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::CoordinateParse,
            format!("failed to parse coordinate from text {:?}", text),
            e,
        )
    })
}

fn in_range(value: i64, dimension: usize) -> Option<usize> {
    usize::try_from(value).ok().filter(|&v| v < dimension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_square() -> Square {
        generate_square(DEFAULT_DIMENSION, "seed").unwrap()
    }

    #[test]
    fn test_known_ciphertext() {
        let square = default_square();
        assert_eq!(encrypt(b"A", &square).unwrap(), "0905");
        assert_eq!(decrypt("0905", &square, 2).unwrap(), b"A");
    }

    #[test]
    fn test_all_byte_values_roundtrip() {
        let square = default_square();
        let bytes: Vec<u8> = (0..=255).collect();
        let encrypted = encrypt(&bytes, &square).unwrap();
        assert_eq!(encrypted.len(), bytes.len() * 4);
        assert!(encrypted.bytes().all(|b| b.is_ascii_digit()));
        assert_eq!(decrypt(&encrypted, &square, 2).unwrap(), bytes);
    }

    #[test]
    fn test_empty_input() {
        let square = default_square();
        assert_eq!(encrypt(b"", &square).unwrap(), "");
        assert_eq!(decrypt("", &square, 2).unwrap(), b"");
    }

    #[test]
    fn test_malformed_length() {
        let err = decrypt("123", &default_square(), 2).expect_err("expected length error");
        assert_eq!(err.kind, Some(ErrorKind::MalformedLength));
        assert_eq!(err.message(), "encrypted text length must be divisible by 4");
    }

    #[test]
    fn test_row_out_of_range() {
        let err = decrypt("1699", &default_square(), 2).expect_err("expected range error");
        assert_eq!(err.kind, Some(ErrorKind::OutOfRange));
        assert!(err.message().contains("row 16"));
    }

    #[test]
    fn test_column_out_of_range() {
        let err = decrypt("0016", &default_square(), 2).expect_err("expected range error");
        assert_eq!(err.kind, Some(ErrorKind::OutOfRange));
    }

    #[test]
    fn test_negative_coordinate_is_out_of_range() {
        let err = decrypt("-100", &default_square(), 2).expect_err("expected range error");
        assert_eq!(err.kind, Some(ErrorKind::OutOfRange));
    }

    #[test]
    fn test_non_numeric_field() {
        let err = decrypt("0a01", &default_square(), 2).expect_err("expected parse error");
        assert_eq!(err.kind, Some(ErrorKind::CoordinateParse));
        assert!(err.message().contains("\"0a\""));
    }

    #[test]
    fn test_non_ascii_does_not_split_chars() {
        // Four characters, eight bytes.
        let err = decrypt("ééé0", &default_square(), 2).expect_err("expected parse error");
        assert_eq!(err.kind, Some(ErrorKind::CoordinateParse));
    }

    #[test]
    fn test_field_whitespace_is_tolerated() {
        let square = default_square();
        let padded = decrypt(" 9 5", &square, 2).unwrap();
        assert_eq!(padded, decrypt("0905", &square, 2).unwrap());
    }

    #[test]
    fn test_unknown_symbol() {
        let square = Square::from_rows(vec![vec![1, 0], vec![3, 2]]).unwrap();
        let err = encrypt(&[0, 4], &square).expect_err("expected unknown symbol");
        assert_eq!(err.kind, Some(ErrorKind::UnknownSymbol));
        assert_eq!(err.message(), "unknown symbol 4");
    }

    #[test]
    fn test_wider_fields() {
        let square = default_square();
        let codec = Codec::with_coordinate_size(square.clone(), 3).unwrap();
        let encrypted = codec.encrypt(b"A").unwrap();
        assert_eq!(encrypted, "009005");
        assert_eq!(codec.decrypt(&encrypted).unwrap(), b"A");
        assert_eq!(decrypt(&encrypted, &square, 3).unwrap(), b"A");
    }

    #[test]
    fn test_overflowing_field_keeps_low_digits() {
        let mut out = String::new();
        push_field(&mut out, 123, 2);
        push_field(&mut out, 7, 2);
        push_field(&mut out, 10, 1);
        assert_eq!(out, "23070");
    }

    #[test]
    fn test_narrow_fields_lose_round_trip_on_large_squares() {
        // Values 10..16 of a 16 x 16 square cannot be told apart from 0..6
        // in a single digit.
        let codec = CipherParams {
            dimension: 16,
            coordinate_size: 1,
        }
        .codec("seed")
        .unwrap();
        let bytes: Vec<u8> = (0..=255).collect();
        let encrypted = codec.encrypt(&bytes).unwrap();
        assert_eq!(encrypted.len(), 512);
        assert_ne!(codec.decrypt(&encrypted).unwrap(), bytes);
    }

    #[test]
    fn test_large_square_values_truncate_to_byte() {
        let square = Square::from_rows(vec![vec![256, 1], vec![2, 3]]).unwrap();
        assert_eq!(decrypt("0000", &square, 2).unwrap(), vec![0u8]);
    }

    #[test]
    fn test_zero_coordinate_size_rejected() {
        let err = decrypt("", &default_square(), 0).expect_err("expected invalid size");
        assert_eq!(err.kind, Some(ErrorKind::InvalidParameter));
    }

    #[test]
    fn test_huge_coordinate_size_rejected() {
        let err = Codec::with_coordinate_size(default_square(), usize::MAX / 2 + 1)
            .expect_err("pair length overflows");
        assert_eq!(err.kind, Some(ErrorKind::InvalidParameter));

        let err = decrypt("0000", &default_square(), usize::MAX).expect_err("expected invalid size");
        assert_eq!(err.kind, Some(ErrorKind::InvalidParameter));
    }

    #[test]
    fn test_unallocatable_ciphertext_rejected() {
        let codec = Codec::with_coordinate_size(default_square(), usize::MAX / 2).unwrap();
        let err = codec.encrypt(b"A").expect_err("ciphertext cannot be allocated");
        assert_eq!(err.kind, Some(ErrorKind::InvalidParameter));

        let err = codec.encrypt(&[0u8; 3]).expect_err("ciphertext length overflows");
        assert_eq!(err.kind, Some(ErrorKind::InvalidParameter));

        assert_eq!(codec.encrypt(b"").unwrap(), "");
        let err = codec.decrypt("0000").expect_err("expected length error");
        assert_eq!(err.kind, Some(ErrorKind::MalformedLength));
    }

    #[test]
    fn test_small_square_rejects_high_bytes() {
        let codec = CipherParams {
            dimension: 4,
            coordinate_size: 2,
        }
        .codec("tiny")
        .unwrap();
        assert_eq!(
            codec.decrypt(&codec.encrypt(&[0, 15, 7]).unwrap()).unwrap(),
            vec![0, 15, 7]
        );
        let err = codec.encrypt(&[16]).expect_err("16 is not in a 4x4 square");
        assert_eq!(err.kind, Some(ErrorKind::UnknownSymbol));
    }
}
