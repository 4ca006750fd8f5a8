//! The structured-text document shared by the JSON and YAML codecs.
//!
//! ```yaml
//! nbt:
//! - name: ""
//!   tagType: 10
//!   value:
//!   - name: Test
//!     tagType: 2
//!     value: 256
//! ```
//!
//! Both codecs parse their text into a generic [`serde_json::Value`] and then
//! build a [`Document`] with [`Document::from_value`], so a document read from
//! JSON and one read from YAML are the same value for the same content.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Result, SchemaError, SchemaErrorKind, UnsupportedError};
use crate::tag::TagType;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub nbt: Vec<Record>,
}

/// One `{name, tagType, value}` record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub name: String,
    #[serde(rename = "tagType")]
    pub tag_type: TagType,
    /// Element type of a List, so that empty lists keep it.
    #[serde(rename = "tagListType", skip_serializing_if = "Option::is_none")]
    pub list_type: Option<TagType>,
    pub value: Payload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// Members of a Compound or elements of a List.
    Records(Vec<Record>),
    /// A primitive or an array of primitives, checked against `tagType` by the mapper.
    Literal(Value),
}

impl Document {
    pub fn new(nbt: Vec<Record>) -> Self {
        Self { comment: None, nbt }
    }

    /// Builds a document out of a generic parsed value, checking the record shape.
    ///
    /// Unknown top-level keys are ignored. Whether a literal fits its `tagType` is
    /// left to [`from_document`](crate::mapper::from_document).
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut map) = value else {
            return Err(SchemaError::new("", SchemaErrorKind::NotADocument).into());
        };

        let comment = match map.remove("comment") {
            None | Some(Value::Null) => None,
            Some(Value::String(comment)) => Some(comment),
            Some(_) => {
                return Err(invalid_field("comment", "comment", "a string").into());
            }
        };

        let nbt = match map.remove("nbt") {
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| Record::from_value(item, &format!("nbt[{index}]")))
                .collect::<Result<Vec<_>>>()?,
            None => {
                return Err(SchemaError::new("", SchemaErrorKind::MissingField("nbt")).into());
            }
            Some(_) => {
                return Err(invalid_field("nbt", "nbt", "a sequence of records").into());
            }
        };

        Ok(Self { comment, nbt })
    }
}

impl Record {
    pub fn new(name: impl Into<String>, tag_type: TagType, value: Payload) -> Self {
        Self {
            name: name.into(),
            tag_type,
            list_type: None,
            value,
        }
    }

    fn from_value(value: Value, path: &str) -> Result<Self> {
        let Value::Object(mut map) = value else {
            return Err(SchemaError::new(path, SchemaErrorKind::NotARecord).into());
        };

        let tag_type = match map.remove("tagType") {
            Some(code) => tag_type_from_value(&code, "tagType", path)?,
            None => {
                return Err(SchemaError::new(path, SchemaErrorKind::MissingField("tagType")).into())
            }
        };
        let name = match map.remove("name") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(name)) => name,
            Some(_) => return Err(invalid_field(path, "name", "a string").into()),
        };
        let list_type = match map.remove("tagListType") {
            Some(code) if tag_type == TagType::List && !code.is_null() => {
                Some(tag_type_from_value(&code, "tagListType", path)?)
            }
            _ => None,
        };
        let value = map.remove("value");

        let (list_type, value) = match (tag_type, value) {
            // Legacy End records carry no meaningful value.
            (TagType::End, value) => (None, Payload::Literal(value.unwrap_or(Value::Null))),
            (_, None) => {
                return Err(SchemaError::new(path, SchemaErrorKind::MissingField("value")).into())
            }
            (TagType::Compound, Some(Value::Array(items))) => {
                (None, Payload::Records(records_from_values(items, path)?))
            }
            (TagType::List, Some(Value::Array(items))) => {
                (list_type, Payload::Records(records_from_values(items, path)?))
            }
            (TagType::List, Some(Value::Object(legacy))) => legacy_list(legacy, path)?,
            (tag @ (TagType::List | TagType::Compound), Some(_)) => {
                return Err(SchemaError::new(
                    format!("{path}.value"),
                    SchemaErrorKind::Shape {
                        tag,
                        expected: "a sequence of records",
                    },
                )
                .into());
            }
            (_, Some(value)) => (None, Payload::Literal(value)),
        };

        Ok(Self {
            name,
            tag_type,
            list_type,
            value,
        })
    }
}

fn records_from_values(items: Vec<Value>, path: &str) -> Result<Vec<Record>> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| Record::from_value(item, &format!("{path}.value[{index}]")))
        .collect()
}

/// Lists written as `{tagListType, list: [payload, ...]}`, where each element is
/// a bare payload instead of a record.
fn legacy_list(mut legacy: Map<String, Value>, path: &str) -> Result<(Option<TagType>, Payload)> {
    let value_path = format!("{path}.value");
    let element = match legacy.remove("tagListType") {
        Some(code) => tag_type_from_value(&code, "tagListType", &value_path)?,
        None => {
            return Err(
                SchemaError::new(value_path, SchemaErrorKind::MissingField("tagListType")).into(),
            )
        }
    };
    let items = match legacy.remove("list") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(invalid_field(&value_path, "list", "a sequence").into()),
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let mut record = Map::new();
            record.insert("tagType".to_owned(), Value::from(element.to_u8()));
            record.insert("value".to_owned(), item);
            Record::from_value(Value::Object(record), &format!("{path}.value[{index}]"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((Some(element), Payload::Records(records)))
}

fn tag_type_from_value(value: &Value, field: &'static str, path: &str) -> Result<TagType> {
    let code = match value {
        Value::Number(number) => number
            .as_i64()
            .map(i128::from)
            .or_else(|| number.as_u64().map(i128::from)),
        _ => None,
    };
    let Some(code) = code else {
        return Err(invalid_field(path, field, "an integer").into());
    };
    u8::try_from(code)
        .ok()
        .and_then(|code| TagType::try_from(code).ok())
        .ok_or_else(|| {
            UnsupportedError {
                code,
                path: path.to_owned(),
            }
            .into()
        })
}

fn invalid_field(path: &str, field: &'static str, expected: &'static str) -> SchemaError {
    SchemaError::new(path, SchemaErrorKind::InvalidField { field, expected })
}
