//! Conversion between [`NbtTag`] trees and [`Document`]s.
//!
//! Numbers are written as plain JSON/YAML numbers. Float and Double values that
//! have no numeric literal (NaN and the infinities) are written as the strings
//! `"NaN"`, `"Infinity"` and `"-Infinity"`.
//!
//! On input a Long (or LongArray element) may also be a decimal string or a
//! `{valueLeast, valueMost}` pair of 32-bit halves, and integers must fit the
//! range of their tag type.

use serde_json::{Map, Number, Value};

use crate::document::{Document, Payload, Record};
use crate::error::{Error, Result, SchemaError, SchemaErrorKind, UnsupportedError};
use crate::tag::TagType;
use crate::value::{NbtCompound, NbtList, NbtTag, NbtValue};

/// Renders `tag` as a document holding a single root record.
pub fn to_document(tag: &NbtTag) -> Document {
    Document::new(vec![to_record(&tag.name, &tag.value)])
}

fn to_record(name: &str, value: &NbtValue) -> Record {
    let mut list_type = None;
    let payload = match value {
        NbtValue::Byte(v) => Payload::Literal(Value::from(*v)),
        NbtValue::Short(v) => Payload::Literal(Value::from(*v)),
        NbtValue::Int(v) => Payload::Literal(Value::from(*v)),
        NbtValue::Long(v) => Payload::Literal(Value::from(*v)),
        NbtValue::Float(v) => Payload::Literal(float_to_value(widen(*v))),
        NbtValue::Double(v) => Payload::Literal(float_to_value(*v)),
        NbtValue::ByteArray(array) => Payload::Literal(array.iter().copied().collect()),
        NbtValue::String(string) => Payload::Literal(Value::String(string.clone())),
        NbtValue::List(list) => {
            list_type = Some(list.element_type());
            Payload::Records(list.iter().map(|item| to_record("", item)).collect())
        }
        NbtValue::Compound(compound) => Payload::Records(
            compound
                .iter()
                .map(|(name, value)| to_record(name, value))
                .collect(),
        ),
        NbtValue::IntArray(array) => Payload::Literal(array.iter().copied().collect()),
        NbtValue::LongArray(array) => Payload::Literal(array.iter().copied().collect()),
    };

    Record {
        name: name.to_owned(),
        tag_type: value.tag_type(),
        list_type,
        value: payload,
    }
}

/// Widens an `f32` through its shortest decimal form, so `0.1f32` prints as `0.1`
/// rather than `0.10000000149011612`. Narrowing the result gives back the same `f32`.
fn widen(v: f32) -> f64 {
    v.to_string().parse().unwrap_or_else(|_| f64::from(v))
}

fn float_to_value(v: f64) -> Value {
    match Number::from_f64(v) {
        Some(number) => Value::Number(number),
        None if v.is_nan() => Value::from("NaN"),
        None if v.is_sign_positive() => Value::from("Infinity"),
        None => Value::from("-Infinity"),
    }
}

/// Builds the tree described by `document`, which must hold exactly one root record.
pub fn from_document(document: &Document) -> Result<NbtTag> {
    let [record] = document.nbt.as_slice() else {
        return Err(
            SchemaError::new("nbt", SchemaErrorKind::RootCount(document.nbt.len())).into(),
        );
    };
    let path = "nbt[0]";
    if record.tag_type == TagType::End {
        return Err(unsupported_end(path));
    }

    Ok(NbtTag {
        name: record.name.clone(),
        value: value_from_record(record, path)?,
    })
}

fn value_from_record(record: &Record, path: &str) -> Result<NbtValue> {
    let tag = record.tag_type;
    match (&record.value, tag) {
        (Payload::Records(records), TagType::Compound) => {
            Ok(NbtValue::Compound(compound_from_records(records, path)?))
        }
        (Payload::Records(records), TagType::List) => Ok(NbtValue::List(list_from_records(
            records,
            record.list_type,
            path,
        )?)),
        (Payload::Literal(_), TagType::List | TagType::Compound) => {
            Err(shape(path, tag, "a sequence of records"))
        }
        (Payload::Records(_), _) => Err(shape(path, tag, expected_literal(tag))),
        (Payload::Literal(value), _) => literal(tag, value, &format!("{path}.value")),
    }
}

fn compound_from_records(records: &[Record], path: &str) -> Result<NbtCompound> {
    let mut compound = NbtCompound::new();
    for (index, member) in records.iter().enumerate() {
        // Older documents spell out the compound terminator.
        if member.tag_type == TagType::End {
            continue;
        }
        let member_path = format!("{path}.value[{index}]");
        let value = value_from_record(member, &member_path)?;
        compound
            .insert(member.name.as_str(), value)
            .map_err(|err| err.at(&member_path))?;
    }
    Ok(compound)
}

fn list_from_records(
    records: &[Record],
    list_type: Option<TagType>,
    path: &str,
) -> Result<NbtList> {
    let element = list_type
        .or_else(|| records.first().map(|record| record.tag_type))
        .unwrap_or(TagType::End);

    let mut list = NbtList::with_type(element);
    for (index, item) in records.iter().enumerate() {
        let item_path = format!("{path}.value[{index}]");
        if item.tag_type == TagType::End {
            return Err(unsupported_end(&item_path));
        }
        if item.tag_type != element {
            return Err(SchemaError::new(
                item_path,
                SchemaErrorKind::HeterogeneousList {
                    expected: element,
                    found: item.tag_type,
                },
            )
            .into());
        }
        let value = value_from_record(item, &item_path)?;
        list.push(value).map_err(|err| err.at(&item_path))?;
    }
    Ok(list)
}

fn literal(tag: TagType, value: &Value, path: &str) -> Result<NbtValue> {
    Ok(match tag {
        TagType::Byte => NbtValue::Byte(integer(value, tag, path)?),
        TagType::Short => NbtValue::Short(integer(value, tag, path)?),
        TagType::Int => NbtValue::Int(integer(value, tag, path)?),
        TagType::Long => NbtValue::Long(long(value, path)?),
        TagType::Float => NbtValue::Float(float32(value, path)?),
        TagType::Double => NbtValue::Double(float64(value, tag, path)?),
        TagType::ByteArray => NbtValue::ByteArray(array(value, tag, path, |item, path| {
            integer(item, TagType::Byte, path)
        })?),
        TagType::String => match value {
            Value::String(string) => NbtValue::String(string.clone()),
            _ => return Err(shape(path, tag, "a string")),
        },
        TagType::IntArray => NbtValue::IntArray(array(value, tag, path, |item, path| {
            integer(item, TagType::Int, path)
        })?),
        TagType::LongArray => NbtValue::LongArray(array(value, tag, path, long)?),
        TagType::List | TagType::Compound => {
            return Err(shape(path, tag, "a sequence of records"))
        }
        TagType::End => return Err(unsupported_end(path)),
    })
}

fn array<T>(
    value: &Value,
    tag: TagType,
    path: &str,
    element: impl Fn(&Value, &str) -> Result<T>,
) -> Result<Vec<T>> {
    let Value::Array(items) = value else {
        return Err(shape(path, tag, "a sequence of numbers"));
    };
    items
        .iter()
        .enumerate()
        .map(|(index, item)| element(item, &format!("{path}[{index}]")))
        .collect()
}

fn integer<T>(value: &Value, tag: TagType, path: &str) -> Result<T>
where
    T: TryFrom<i64>,
{
    let Value::Number(number) = value else {
        return Err(shape(path, tag, "an integer"));
    };
    let Some(wide) = number.as_i64() else {
        // Integers beyond u64 reach here as whole floats.
        let huge = number
            .as_f64()
            .is_some_and(|v| v.fract() == 0.0 && v.abs() >= 2f64.powi(63));
        return Err(if number.is_u64() || huge {
            out_of_range(path, tag, number)
        } else {
            shape(path, tag, "an integer")
        });
    };
    T::try_from(wide).map_err(|_| out_of_range(path, tag, number))
}

fn long(value: &Value, path: &str) -> Result<i64> {
    const EXPECTED: &str = "an integer, a decimal string or {valueLeast, valueMost}";
    let tag = TagType::Long;
    match value {
        Value::Number(_) => integer(value, tag, path),
        Value::String(string) => {
            let string = string.trim();
            string.parse::<i64>().map_err(|_| {
                if string.parse::<i128>().is_ok() {
                    out_of_range(path, tag, string)
                } else {
                    shape(path, tag, EXPECTED)
                }
            })
        }
        Value::Object(halves) => long_from_halves(halves).ok_or_else(|| shape(path, tag, EXPECTED)),
        _ => Err(shape(path, tag, EXPECTED)),
    }
}

/// `valueLeast` holds the low 32 bits as an unsigned number. `valueMost` holds
/// the high 32 bits, signed or unsigned.
fn long_from_halves(halves: &Map<String, Value>) -> Option<i64> {
    let least = halves.get("valueLeast")?.as_u64()?;
    let least = u32::try_from(least).ok()?;
    let most = halves.get("valueMost")?.as_i64()?;
    let most = if (i64::from(i32::MIN)..=i64::from(u32::MAX)).contains(&most) {
        most as u32
    } else {
        return None;
    };
    Some(((u64::from(most) << 32) | u64::from(least)) as i64)
}

fn float64(value: &Value, tag: TagType, path: &str) -> Result<f64> {
    match value {
        Value::Number(number) => number.as_f64().ok_or_else(|| shape(path, tag, "a number")),
        Value::String(string) => match string.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            _ => Err(shape(path, tag, "a number, \"NaN\", \"Infinity\" or \"-Infinity\"")),
        },
        _ => Err(shape(path, tag, "a number")),
    }
}

fn float32(value: &Value, path: &str) -> Result<f32> {
    let tag = TagType::Float;
    let wide = float64(value, tag, path)?;
    let narrow = wide as f32;
    // Values within rounding distance of f32::MAX narrow to it instead of infinity.
    if wide.is_finite() && narrow.is_infinite() {
        return Err(out_of_range(path, tag, wide));
    }
    Ok(narrow)
}

fn expected_literal(tag: TagType) -> &'static str {
    match tag {
        TagType::Byte | TagType::Short | TagType::Int => "an integer",
        TagType::Long => "an integer or a decimal string",
        TagType::Float | TagType::Double => "a number",
        TagType::String => "a string",
        TagType::ByteArray | TagType::IntArray | TagType::LongArray => "a sequence of numbers",
        TagType::End | TagType::List | TagType::Compound => "a sequence of records",
    }
}

fn shape(path: &str, tag: TagType, expected: &'static str) -> Error {
    SchemaError::new(path, SchemaErrorKind::Shape { tag, expected }).into()
}

fn out_of_range(path: &str, tag: TagType, value: impl ToString) -> Error {
    SchemaError::new(
        path,
        SchemaErrorKind::OutOfRange {
            tag,
            value: value.to_string(),
        },
    )
    .into()
}

fn unsupported_end(path: &str) -> Error {
    UnsupportedError {
        code: 0,
        path: path.to_owned(),
    }
    .into()
}
