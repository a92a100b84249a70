use crate::error::{ErrorCategory, ErrorKind, PolybiusError};
use std::fmt;
use std::str::FromStr;

/// Direction of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Encrypt,
    Decrypt,
}

impl FromStr for Mode {
    type Err = PolybiusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "encrypt" => Ok(Mode::Encrypt),
            "decrypt" => Ok(Mode::Decrypt),
            other => Err(PolybiusError::with_kind(
                ErrorCategory::User,
                ErrorKind::UnknownMode,
                format!("unknown mode {}", other),
            )),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Encrypt => "encrypt",
            Mode::Decrypt => "decrypt",
        })
    }
}
