use std::str::Utf8Error;

use thiserror::Error;

use crate::tag::TagType;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Any failure of a conversion. Each call either fully succeeds or returns one of these.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Unsupported(#[from] UnsupportedError),
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Decode,
    Encode,
    Schema,
    Parse,
    Unsupported,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Decode(_) => ErrorKind::Decode,
            Error::Encode(EncodeError::Schema(_)) | Error::Schema(_) => ErrorKind::Schema,
            Error::Encode(_) => ErrorKind::Encode,
            Error::Parse(_) => ErrorKind::Parse,
            Error::Unsupported(_) => ErrorKind::Unsupported,
        }
    }
}

/// The binary input is not valid NBT. Positions are byte offsets into the input.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unexpected end of data at position {pos}, needed {needed} bytes but {remaining} remain")]
    Truncated {
        pos: usize,
        needed: usize,
        remaining: usize,
    },
    #[error("invalid NBT tag {value} at position {pos}")]
    InvalidTag { value: u8, pos: usize },
    #[error("NBT list at position {pos} has element type End but {len} elements")]
    InvalidListType { pos: usize, len: usize },
    #[error("unexpected NBT end tag at position {pos}")]
    UnexpectedEnd { pos: usize },
    #[error("negative length {len} at position {pos}")]
    NegativeLength { len: i32, pos: usize },
    #[error("length {len} at position {pos} runs past the end of data ({remaining} bytes remain)")]
    LengthOverrun {
        len: usize,
        pos: usize,
        remaining: usize,
    },
    #[error("NBT nesting deeper than {max} at position {pos}")]
    DepthExceeded { max: usize, pos: usize },
    #[error("invalid UTF-8 in NBT string at position {pos}")]
    InvalidUtf8 {
        pos: usize,
        #[source]
        source: Utf8Error,
    },
    #[error("duplicate NBT compound entry {name:?} at position {pos}")]
    DuplicateName { name: String, pos: usize },
    #[error("{count} trailing bytes after the root tag at position {pos}")]
    TrailingBytes { pos: usize, count: usize },
    #[error("error while inflating gzip input: {0}")]
    Gzip(#[source] std::io::Error),
    #[error("gzip input inflates to more than {max} bytes")]
    InflatedTooLarge { max: usize },
}

/// A tree or document cannot be written out.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("NBT string of {len} bytes does not fit a 16-bit length")]
    StringTooLong { len: usize },
    #[error("NBT array or list of {len} elements does not fit a 32-bit length")]
    ArrayTooLong { len: usize },
    #[error("NBT nesting deeper than {max}")]
    DepthExceeded { max: usize },
    #[error("error while serializing JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("error while serializing YAML: {0}")]
    Yaml(#[source] serde_yaml::Error),
    #[error("error while compressing gzip output: {0}")]
    Gzip(#[source] std::io::Error),
}

/// Malformed JSON or YAML text. Both inner errors report a line and column.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("invalid YAML: {0}")]
    Yaml(#[source] serde_yaml::Error),
}

impl ParseError {
    /// One-based line and column of the offending text, when known.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            ParseError::Json(err) => Some((err.line(), err.column())),
            ParseError::Yaml(err) => err.location().map(|loc| (loc.line(), loc.column())),
        }
    }
}

/// A value does not have the shape its tag type requires.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}{}", at_path(.path))]
pub struct SchemaError {
    /// Where in the document the problem is, like `nbt[0].value[2]`. Empty when
    /// the error comes from building a tree directly.
    pub path: String,
    pub kind: SchemaErrorKind,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchemaErrorKind {
    #[error("expected a mapping with an `nbt` sequence")]
    NotADocument,
    #[error("expected a record with `name`, `tagType` and `value`")]
    NotARecord,
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` should be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
    #[error("{tag} value should be {expected}")]
    Shape { tag: TagType, expected: &'static str },
    #[error("duplicate compound entry {0:?}")]
    DuplicateName(String),
    #[error("list of {expected} cannot hold {found}")]
    HeterogeneousList { expected: TagType, found: TagType },
    #[error("{value} is out of range for {tag}")]
    OutOfRange { tag: TagType, value: String },
    #[error("expected exactly one root record, found {0}")]
    RootCount(usize),
}

impl SchemaError {
    pub fn new(path: impl Into<String>, kind: SchemaErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Attaches `path` if the error does not carry one yet.
    pub fn at(mut self, path: &str) -> Self {
        if self.path.is_empty() {
            self.path = path.to_owned();
        }
        self
    }
}

impl From<SchemaErrorKind> for SchemaError {
    fn from(kind: SchemaErrorKind) -> Self {
        Self::new("", kind)
    }
}

/// A `tagType` code outside the known table.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("unsupported tagType {code}{}", at_path(.path))]
pub struct UnsupportedError {
    pub code: i128,
    pub path: String,
}

fn at_path(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" at {path}")
    }
}
