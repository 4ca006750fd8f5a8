//! Byte order selection.

use std::str::FromStr;

use thiserror::Error;

/// Byte order of every multi-byte number in a buffer.
///
/// Java Edition and most NBT tools use big endian; Bedrock Edition uses little endian.
/// Never detected automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Big,
    Little,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown byte order {0:?}, expected `big` or `little`")]
pub struct ParseEndiannessError(String);

impl FromStr for Endianness {
    type Err = ParseEndiannessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "big" | "be" | "java" => Ok(Endianness::Big),
            "little" | "le" | "bedrock" => Ok(Endianness::Little),
            _ => Err(ParseEndiannessError(s.to_owned())),
        }
    }
}
