//! Owned NBT tree representation.

use indexmap::IndexMap;

use crate::error::{SchemaError, SchemaErrorKind};
use crate::tag::TagType;

/// The payload of one NBT tag. There is no `End` variant: the terminator never
/// appears as a standalone value.
#[derive(Debug, Clone, PartialEq)]
pub enum NbtValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(NbtList),
    Compound(NbtCompound),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl NbtValue {
    pub fn tag_type(&self) -> TagType {
        match self {
            NbtValue::Byte(_) => TagType::Byte,
            NbtValue::Short(_) => TagType::Short,
            NbtValue::Int(_) => TagType::Int,
            NbtValue::Long(_) => TagType::Long,
            NbtValue::Float(_) => TagType::Float,
            NbtValue::Double(_) => TagType::Double,
            NbtValue::ByteArray(_) => TagType::ByteArray,
            NbtValue::String(_) => TagType::String,
            NbtValue::List(_) => TagType::List,
            NbtValue::Compound(_) => TagType::Compound,
            NbtValue::IntArray(_) => TagType::IntArray,
            NbtValue::LongArray(_) => TagType::LongArray,
        }
    }
}

macro_rules! value_from {
    ( $($ty:ty => $variant:ident;)* ) => {
        $(
            impl From<$ty> for NbtValue {
                #[inline]
                fn from(value: $ty) -> Self {
                    NbtValue::$variant(value)
                }
            }
        )*
    };
}

value_from! {
    i8 => Byte;
    i16 => Short;
    i32 => Int;
    i64 => Long;
    f32 => Float;
    f64 => Double;
    Vec<i8> => ByteArray;
    String => String;
    NbtList => List;
    NbtCompound => Compound;
    Vec<i32> => IntArray;
    Vec<i64> => LongArray;
}

impl From<&str> for NbtValue {
    fn from(value: &str) -> Self {
        NbtValue::String(value.to_owned())
    }
}

/// A homogeneous sequence of unnamed values.
///
/// The element type is fixed by [`NbtList::with_type`] or by the first pushed
/// value; an empty list created with [`NbtList::new`] is untyped (`End`).
#[derive(Debug, Clone, PartialEq)]
pub struct NbtList {
    pub(crate) tag: TagType,
    pub(crate) items: Vec<NbtValue>,
}

impl Default for NbtList {
    fn default() -> Self {
        Self::new()
    }
}

impl NbtList {
    pub fn new() -> Self {
        Self::with_type(TagType::End)
    }

    pub fn with_type(tag: TagType) -> Self {
        Self {
            tag,
            items: Vec::new(),
        }
    }

    /// The declared element type.
    pub fn element_type(&self) -> TagType {
        self.tag
    }

    /// Appends `value`, failing if its type differs from the list's element type.
    pub fn push(&mut self, value: impl Into<NbtValue>) -> Result<(), SchemaError> {
        let value = value.into();
        let found = value.tag_type();
        if self.tag == TagType::End && self.items.is_empty() {
            self.tag = found;
        } else if self.tag != found {
            return Err(SchemaErrorKind::HeterogeneousList {
                expected: self.tag,
                found,
            }
            .into());
        }
        self.items.push(value);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&NbtValue> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NbtValue> {
        self.items.iter()
    }
}

impl TryFrom<Vec<NbtValue>> for NbtList {
    type Error = SchemaError;

    fn try_from(values: Vec<NbtValue>) -> Result<Self, Self::Error> {
        let mut list = NbtList::new();
        list.items.reserve(values.len());
        for (index, value) in values.into_iter().enumerate() {
            list.push(value).map_err(|err| err.at(&format!("[{index}]")))?;
        }
        Ok(list)
    }
}

impl<'a> IntoIterator for &'a NbtList {
    type Item = &'a NbtValue;
    type IntoIter = std::slice::Iter<'a, NbtValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An ordered mapping of unique names to values. Insertion order is kept.
#[derive(Debug, Clone, Default)]
pub struct NbtCompound {
    pub(crate) entries: IndexMap<String, NbtValue>,
}

// `IndexMap` equality ignores order, compounds compare entry by entry.
impl PartialEq for NbtCompound {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

macro_rules! entry_getter {
    ($name:ident, $variant:ident, $ret:ty) => {
        pub fn $name(&self, name: &str) -> Option<$ret> {
            match self.entries.get(name) {
                Some(NbtValue::$variant(v)) => Some(*v),
                _ => None,
            }
        }
    };
}

macro_rules! entry_getter_ref {
    ($name:ident, $variant:ident, $ret:ty) => {
        pub fn $name(&self, name: &str) -> Option<&$ret> {
            match self.entries.get(name) {
                Some(NbtValue::$variant(v)) => Some(v),
                _ => None,
            }
        }
    };
}

impl NbtCompound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new entry at the end. Names must be unique: inserting a name
    /// that is already present fails and leaves the compound unchanged.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<NbtValue>,
    ) -> Result<(), SchemaError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(SchemaErrorKind::DuplicateName(name).into());
        }
        self.entries.insert(name, value.into());
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(
        mut self,
        name: impl Into<String>,
        value: impl Into<NbtValue>,
    ) -> Result<Self, SchemaError> {
        self.insert(name, value)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&NbtValue> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NbtValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    entry_getter!(byte, Byte, i8);
    entry_getter!(short, Short, i16);
    entry_getter!(int, Int, i32);
    entry_getter!(long, Long, i64);
    entry_getter!(float, Float, f32);
    entry_getter!(double, Double, f64);
    entry_getter_ref!(byte_array, ByteArray, Vec<i8>);
    entry_getter_ref!(string, String, String);
    entry_getter_ref!(list, List, NbtList);
    entry_getter_ref!(compound, Compound, NbtCompound);
    entry_getter_ref!(int_array, IntArray, Vec<i32>);
    entry_getter_ref!(long_array, LongArray, Vec<i64>);
}

/// A root tag: a value with the name it was stored under (usually empty).
#[derive(Debug, Clone, PartialEq)]
pub struct NbtTag {
    pub name: String,
    pub value: NbtValue,
}

impl NbtTag {
    pub fn new(name: impl Into<String>, value: impl Into<NbtValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn tag_type(&self) -> TagType {
        self.value.tag_type()
    }
}
