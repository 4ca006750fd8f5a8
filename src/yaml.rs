//! YAML syntax for [`Document`]s.
//!
//! The text is read into the same generic value as JSON before the document is
//! built, so both syntaxes accept exactly the same documents.

use serde_json::Value;

use crate::document::Document;
use crate::error::{EncodeError, ParseError};

pub fn parse(text: &str) -> crate::Result<Document> {
    let value: Value = serde_yaml::from_str(text).map_err(ParseError::Yaml)?;
    Document::from_value(value)
}

pub fn print(document: &Document) -> Result<String, EncodeError> {
    serde_yaml::to_string(document).map_err(EncodeError::Yaml)
}
