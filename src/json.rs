//! JSON syntax for [`Document`]s.

use serde_json::Value;

use crate::document::Document;
use crate::error::{EncodeError, ParseError};

pub fn parse(text: &str) -> crate::Result<Document> {
    let value: Value = serde_json::from_str(text).map_err(ParseError::Json)?;
    Document::from_value(value)
}

/// Compact JSON with keys in record order.
pub fn print(document: &Document) -> Result<String, EncodeError> {
    serde_json::to_string(document).map_err(EncodeError::Json)
}

/// Like [`print`], indented by two spaces.
pub fn print_pretty(document: &Document) -> Result<String, EncodeError> {
    serde_json::to_string_pretty(document).map_err(EncodeError::Json)
}
