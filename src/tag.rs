use std::fmt::{Debug, Display};

use serde::{Serialize, Serializer};

/// The kind of an NBT tag. The discriminant is the type code used both in the
/// binary format and as `tagType` in the textual documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagType {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
}

impl TagType {
    #[inline]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Smallest number of bytes a payload of this kind can occupy.
    ///
    /// Used to reject list lengths that could never fit in the remaining input
    /// before allocating for them.
    pub const fn min_payload_len(self) -> usize {
        match self {
            TagType::End => 0,
            TagType::Byte => 1,
            TagType::Short => 2,
            TagType::Int | TagType::Float => 4,
            TagType::Long | TagType::Double => 8,
            TagType::ByteArray | TagType::IntArray | TagType::LongArray => 4,
            TagType::String => 2,
            // Element tag + length.
            TagType::List => 5,
            // Just the end tag.
            TagType::Compound => 1,
        }
    }
}

impl TryFrom<u8> for TagType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => TagType::End,
            1 => TagType::Byte,
            2 => TagType::Short,
            3 => TagType::Int,
            4 => TagType::Long,
            5 => TagType::Float,
            6 => TagType::Double,
            7 => TagType::ByteArray,
            8 => TagType::String,
            9 => TagType::List,
            10 => TagType::Compound,
            11 => TagType::IntArray,
            12 => TagType::LongArray,
            _ => return Err(value),
        })
    }
}

impl From<TagType> for u8 {
    #[inline]
    fn from(value: TagType) -> Self {
        value.to_u8()
    }
}

impl Display for TagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <TagType as Debug>::fmt(self, f)
    }
}

impl Serialize for TagType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.to_u8())
    }
}
