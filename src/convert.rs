//! One-call conversions between binary NBT and JSON or YAML text.
//!
//! Every function is independent: it takes its input by reference, returns a
//! freshly allocated output and keeps nothing between calls.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::decode::{decode_with, DecodeOptions, TrailingBytes};
use crate::document::Document;
use crate::encode::{encode_with, EncodeOptions};
use crate::endian::Endianness;
use crate::error::{DecodeError, EncodeError, Result};
use crate::mapper::{from_document, to_document};
use crate::{json, yaml};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Deepest nesting of lists and compounds the JSON and YAML parsers can read
/// back.
///
/// Both parsers stop at about 128 nested sequences and mappings. Every NBT level
/// takes a record mapping and a value sequence, and an array at the innermost
/// level takes two more. Conversions never go deeper than this, so any text they
/// print converts back.
pub const TEXT_MAX_DEPTH: usize = 61;

/// Default cap on the size of inflated gzip input. Level and player files are
/// far smaller.
pub const DEFAULT_MAX_INFLATED: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub endianness: Endianness,
    /// Maximum nesting of lists and compounds, capped at [`TEXT_MAX_DEPTH`].
    pub max_depth: usize,
    pub trailing: TrailingBytes,
    /// Root tag without a name ("network NBT"), both when reading and writing.
    pub unnamed_root: bool,
    /// Indent JSON output. YAML output is always block style.
    pub pretty: bool,
    /// Written as the document's top-level `comment`.
    pub comment: Option<String>,
    /// Leading bytes to drop from binary input, after inflating it. Bedrock's
    /// `level.dat` has an 8-byte header.
    pub skip: usize,
    /// Gzip the binary output.
    pub gzip: bool,
    /// Gzip input inflating to more bytes than this fails.
    pub max_inflated: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            endianness: Endianness::default(),
            max_depth: TEXT_MAX_DEPTH,
            trailing: TrailingBytes::default(),
            unnamed_root: false,
            pretty: false,
            comment: None,
            skip: 0,
            gzip: false,
            max_inflated: DEFAULT_MAX_INFLATED,
        }
    }
}

impl ConvertOptions {
    pub fn with_endianness(endianness: Endianness) -> Self {
        Self {
            endianness,
            ..Default::default()
        }
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            endianness: self.endianness,
            max_depth: self.max_depth.min(TEXT_MAX_DEPTH),
            trailing: self.trailing,
            unnamed_root: self.unnamed_root,
        }
    }

    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            endianness: self.endianness,
            max_depth: self.max_depth.min(TEXT_MAX_DEPTH),
            unnamed_root: self.unnamed_root,
        }
    }
}

pub fn binary_to_json(bytes: &[u8], endianness: Endianness) -> Result<String> {
    binary_to_json_with(bytes, &ConvertOptions::with_endianness(endianness))
}

pub fn binary_to_json_with(bytes: &[u8], options: &ConvertOptions) -> Result<String> {
    let document = binary_to_document(bytes, options)?;
    let text = if options.pretty {
        json::print_pretty(&document)?
    } else {
        json::print(&document)?
    };
    tracing::trace!("Converted {} bytes of NBT to {} bytes of JSON.", bytes.len(), text.len());
    Ok(text)
}

pub fn json_to_binary(text: &str, endianness: Endianness) -> Result<Vec<u8>> {
    json_to_binary_with(text, &ConvertOptions::with_endianness(endianness))
}

pub fn json_to_binary_with(text: &str, options: &ConvertOptions) -> Result<Vec<u8>> {
    let bytes = document_to_binary(&json::parse(text)?, options)?;
    tracing::trace!("Converted {} bytes of JSON to {} bytes of NBT.", text.len(), bytes.len());
    Ok(bytes)
}

pub fn binary_to_yaml(bytes: &[u8], endianness: Endianness) -> Result<String> {
    binary_to_yaml_with(bytes, &ConvertOptions::with_endianness(endianness))
}

pub fn binary_to_yaml_with(bytes: &[u8], options: &ConvertOptions) -> Result<String> {
    let text = yaml::print(&binary_to_document(bytes, options)?)?;
    tracing::trace!("Converted {} bytes of NBT to {} bytes of YAML.", bytes.len(), text.len());
    Ok(text)
}

pub fn yaml_to_binary(text: &str, endianness: Endianness) -> Result<Vec<u8>> {
    yaml_to_binary_with(text, &ConvertOptions::with_endianness(endianness))
}

pub fn yaml_to_binary_with(text: &str, options: &ConvertOptions) -> Result<Vec<u8>> {
    let bytes = document_to_binary(&yaml::parse(text)?, options)?;
    tracing::trace!("Converted {} bytes of YAML to {} bytes of NBT.", text.len(), bytes.len());
    Ok(bytes)
}

fn binary_to_document(bytes: &[u8], options: &ConvertOptions) -> Result<Document> {
    let inflated;
    let mut source = bytes;
    if source.starts_with(&GZIP_MAGIC) {
        inflated = inflate(source, options.max_inflated)?;
        source = inflated.as_slice();
    }
    let source = skip(source, options.skip)?;

    let tag = decode_with(source, &options.decode_options())?;
    let mut document = to_document(&tag);
    document.comment.clone_from(&options.comment);
    Ok(document)
}

fn document_to_binary(document: &Document, options: &ConvertOptions) -> Result<Vec<u8>> {
    let tag = from_document(document)?;
    let bytes = encode_with(&tag, &options.encode_options())?;
    if options.gzip {
        Ok(deflate(&bytes)?)
    } else {
        Ok(bytes)
    }
}

fn skip(source: &[u8], count: usize) -> Result<&[u8], DecodeError> {
    source.get(count..).ok_or(DecodeError::Truncated {
        pos: 0,
        needed: count,
        remaining: source.len(),
    })
}

fn inflate(compressed: &[u8], max: usize) -> Result<Vec<u8>, DecodeError> {
    // One byte past the cap tells a full-size stream from an oversized one.
    let limit = u64::try_from(max).unwrap_or(u64::MAX).saturating_add(1);
    let mut decoder = GzDecoder::new(compressed).take(limit);
    let mut buf = Vec::with_capacity(compressed.len().saturating_mul(4).min(max));
    decoder.read_to_end(&mut buf).map_err(DecodeError::Gzip)?;
    if buf.len() > max {
        return Err(DecodeError::InflatedTooLarge { max });
    }
    tracing::trace!("Inflated {} bytes of gzip input to {} bytes.", compressed.len(), buf.len());
    Ok(buf)
}

fn deflate(bytes: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 2), Compression::default());
    encoder.write_all(bytes).map_err(EncodeError::Gzip)?;
    encoder.finish().map_err(EncodeError::Gzip)
}
