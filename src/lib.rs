//! Lossless conversion of NBT (Named Binary Tag) data to and from JSON and YAML.
//!
//! Binary NBT is decoded into an owned tree ([`NbtTag`]), mapped to a
//! [`Document`] of `{name, tagType, value}` records, and printed as JSON or
//! YAML. The reverse path parses text into the same document type, so a
//! document read from either syntax converts to identical bytes.
//!
//! ```
//! use nbt2json::{binary_to_json, json_to_binary, Endianness};
//!
//! let bytes = [0x0a, 0x00, 0x00, 0x01, 0x00, 0x01, b'a', 0x05, 0x00];
//! let json = binary_to_json(&bytes, Endianness::Big).unwrap();
//! assert_eq!(json, r#"{"nbt":[{"name":"","tagType":10,"value":[{"name":"a","tagType":1,"value":5}]}]}"#);
//! assert_eq!(json_to_binary(&json, Endianness::Big).unwrap(), bytes);
//! ```

pub mod convert;
pub mod decode;
pub mod document;
pub mod encode;
pub mod endian;
pub mod error;
pub mod json;
pub mod mapper;
pub mod tag;
pub mod value;
pub mod yaml;

pub use convert::{
    binary_to_json, binary_to_json_with, binary_to_yaml, binary_to_yaml_with, json_to_binary,
    json_to_binary_with, yaml_to_binary, yaml_to_binary_with, ConvertOptions, TEXT_MAX_DEPTH,
};
pub use decode::{decode, decode_with, DecodeOptions, TrailingBytes};
pub use document::Document;
pub use encode::{encode, encode_with, EncodeOptions};
pub use endian::Endianness;
pub use error::{Error, ErrorKind, Result};
pub use mapper::{from_document, to_document};
pub use tag::TagType;
pub use value::{NbtCompound, NbtList, NbtTag, NbtValue};
