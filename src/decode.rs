//! Binary NBT to [`NbtTag`].

use bytes::Buf;

use crate::endian::Endianness;
use crate::error::DecodeError;
use crate::tag::TagType;
use crate::value::{NbtCompound, NbtList, NbtTag, NbtValue};

/// Default limit of nested lists/compounds, the same limit Minecraft itself enforces.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// What to do with bytes left over after the root tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingBytes {
    /// Ignore them (logged at debug level).
    #[default]
    Ignore,
    /// Fail with [`DecodeError::TrailingBytes`].
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    pub endianness: Endianness,
    /// Maximum nesting of lists and compounds. The root compound counts as depth 1.
    pub max_depth: usize,
    pub trailing: TrailingBytes,
    /// The root tag has a type byte but no name ("network NBT").
    pub unnamed_root: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            endianness: Endianness::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            trailing: TrailingBytes::default(),
            unnamed_root: false,
        }
    }
}

/// Decodes the single root tag at the start of `source`.
pub fn decode(source: &[u8], endianness: Endianness) -> Result<NbtTag, DecodeError> {
    decode_with(
        source,
        &DecodeOptions {
            endianness,
            ..Default::default()
        },
    )
}

pub fn decode_with(source: &[u8], options: &DecodeOptions) -> Result<NbtTag, DecodeError> {
    let mut reader = Reader::new(source, options);

    let tag_pos = reader.pos();
    let tag = reader.read_tag_type()?;
    if tag == TagType::End {
        return Err(DecodeError::UnexpectedEnd { pos: tag_pos });
    }
    let name = if options.unnamed_root {
        String::new()
    } else {
        reader.read_string()?
    };
    let value = reader.read_payload(tag, 0)?;

    let count = reader.source.remaining();
    if count > 0 {
        let pos = reader.pos();
        match options.trailing {
            TrailingBytes::Ignore => {
                tracing::debug!("Ignoring {} trailing bytes at position {}.", count, pos);
            }
            TrailingBytes::Reject => return Err(DecodeError::TrailingBytes { pos, count }),
        }
    }

    Ok(NbtTag { name, value })
}

macro_rules! read_number {
    ( $($name:ident => $ty:ty, $be:ident, $le:ident;)* ) => {
        $(
            fn $name(&mut self) -> Result<$ty, DecodeError> {
                self.ensure(std::mem::size_of::<$ty>())?;
                Ok(match self.endianness {
                    Endianness::Big => self.source.$be(),
                    Endianness::Little => self.source.$le(),
                })
            }
        )*
    };
}

struct Reader<'source> {
    // Advanced by the `Buf` methods, `pos` is derived from what is left.
    source: &'source [u8],
    full_size: usize,
    endianness: Endianness,
    max_depth: usize,
}

impl<'source> Reader<'source> {
    fn new(source: &'source [u8], options: &DecodeOptions) -> Self {
        Self {
            source,
            full_size: source.len(),
            endianness: options.endianness,
            max_depth: options.max_depth,
        }
    }

    #[inline]
    fn pos(&self) -> usize {
        self.full_size - self.source.remaining()
    }

    fn ensure(&self, needed: usize) -> Result<(), DecodeError> {
        let remaining = self.source.remaining();
        if remaining < needed {
            Err(DecodeError::Truncated {
                pos: self.pos(),
                needed,
                remaining,
            })
        } else {
            Ok(())
        }
    }

    read_number! {
        read_i8 => i8, get_i8, get_i8;
        read_u16 => u16, get_u16, get_u16_le;
        read_i16 => i16, get_i16, get_i16_le;
        read_i32 => i32, get_i32, get_i32_le;
        read_i64 => i64, get_i64, get_i64_le;
        read_f32 => f32, get_f32, get_f32_le;
        read_f64 => f64, get_f64, get_f64_le;
    }

    fn read_tag_type(&mut self) -> Result<TagType, DecodeError> {
        let pos = self.pos();
        self.ensure(1)?;
        self.source
            .get_u8()
            .try_into()
            .map_err(|value| DecodeError::InvalidTag { value, pos })
    }

    /// Reads a 32-bit element count and checks that `len` elements of at least
    /// `min_width` bytes each can still fit in the input.
    fn read_len(&mut self, min_width: usize) -> Result<usize, DecodeError> {
        let pos = self.pos();
        let len = self.read_i32()?;
        let len = usize::try_from(len).map_err(|_| DecodeError::NegativeLength { len, pos })?;
        let remaining = self.source.remaining();
        match len.checked_mul(min_width) {
            Some(size) if size <= remaining => Ok(len),
            _ => Err(DecodeError::LengthOverrun {
                len,
                pos,
                remaining,
            }),
        }
    }

    fn read_string(&mut self) -> Result<String, DecodeError> {
        let len_pos = self.pos();
        let len = usize::from(self.read_u16()?);
        let remaining = self.source.remaining();
        if len > remaining {
            return Err(DecodeError::LengthOverrun {
                len,
                pos: len_pos,
                remaining,
            });
        }
        let pos = self.pos();
        let string = std::str::from_utf8(&self.source[..len])
            .map_err(|source| DecodeError::InvalidUtf8 { pos, source })?
            .to_owned();
        self.source.advance(len);
        Ok(string)
    }

    fn enter(&self, depth: usize) -> Result<usize, DecodeError> {
        let depth = depth + 1;
        if depth > self.max_depth {
            Err(DecodeError::DepthExceeded {
                max: self.max_depth,
                pos: self.pos(),
            })
        } else {
            Ok(depth)
        }
    }

    /// Reads the payload of a `tag` whose type (and name, if any) was already consumed.
    fn read_payload(&mut self, tag: TagType, depth: usize) -> Result<NbtValue, DecodeError> {
        Ok(match tag {
            TagType::End => return Err(DecodeError::UnexpectedEnd { pos: self.pos() }),
            TagType::Byte => NbtValue::Byte(self.read_i8()?),
            TagType::Short => NbtValue::Short(self.read_i16()?),
            TagType::Int => NbtValue::Int(self.read_i32()?),
            TagType::Long => NbtValue::Long(self.read_i64()?),
            TagType::Float => NbtValue::Float(self.read_f32()?),
            TagType::Double => NbtValue::Double(self.read_f64()?),
            TagType::ByteArray => {
                let len = self.read_len(1)?;
                let array = self.source[..len].iter().map(|&b| b as i8).collect();
                self.source.advance(len);
                NbtValue::ByteArray(array)
            }
            TagType::String => NbtValue::String(self.read_string()?),
            TagType::List => NbtValue::List(self.read_list(depth)?),
            TagType::Compound => NbtValue::Compound(self.read_compound(depth)?),
            TagType::IntArray => {
                let len = self.read_len(4)?;
                let array = (0..len)
                    .map(|_| self.read_i32())
                    .collect::<Result<_, _>>()?;
                NbtValue::IntArray(array)
            }
            TagType::LongArray => {
                let len = self.read_len(8)?;
                let array = (0..len)
                    .map(|_| self.read_i64())
                    .collect::<Result<_, _>>()?;
                NbtValue::LongArray(array)
            }
        })
    }

    fn read_list(&mut self, depth: usize) -> Result<NbtList, DecodeError> {
        let depth = self.enter(depth)?;
        let pos = self.pos();
        let element = self.read_tag_type()?;
        let len = self.read_len(element.min_payload_len())?;

        // List tag may be end tag only if len == 0.
        if element == TagType::End && len > 0 {
            return Err(DecodeError::InvalidListType { pos, len });
        }

        let mut list = NbtList::with_type(element);
        list.items.reserve_exact(len);
        for _ in 0..len {
            // List items have no tag or name, parsing starts directly at the payload.
            let item = self.read_payload(element, depth)?;
            list.items.push(item);
        }
        Ok(list)
    }

    fn read_compound(&mut self, depth: usize) -> Result<NbtCompound, DecodeError> {
        let depth = self.enter(depth)?;
        let mut compound = NbtCompound::new();
        loop {
            let pos = self.pos();
            let tag = self.read_tag_type()?;
            if tag == TagType::End {
                return Ok(compound);
            }
            let name = self.read_string()?;
            if compound.contains(&name) {
                return Err(DecodeError::DuplicateName { name, pos });
            }
            let value = self.read_payload(tag, depth)?;
            compound.entries.insert(name, value);
        }
    }
}
