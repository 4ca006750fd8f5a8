//! [`NbtTag`] to binary NBT.

use bytes::BufMut;

use crate::decode::DEFAULT_MAX_DEPTH;
use crate::endian::Endianness;
use crate::error::{EncodeError, SchemaError, SchemaErrorKind};
use crate::tag::TagType;
use crate::value::{NbtCompound, NbtList, NbtTag, NbtValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub endianness: Endianness,
    pub max_depth: usize,
    /// Write the root tag without a name ("network NBT").
    pub unnamed_root: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            endianness: Endianness::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            unnamed_root: false,
        }
    }
}

pub fn encode(tag: &NbtTag, endianness: Endianness) -> Result<Vec<u8>, EncodeError> {
    encode_with(
        tag,
        &EncodeOptions {
            endianness,
            ..Default::default()
        },
    )
}

pub fn encode_with(tag: &NbtTag, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer {
        output: Vec::with_capacity(encoded_len(tag, options.unnamed_root)),
        endianness: options.endianness,
        max_depth: options.max_depth,
    };
    writer.put_tag_type(tag.tag_type());
    if !options.unnamed_root {
        writer.put_string(&tag.name)?;
    }
    writer.put_payload(&tag.value, 0)?;
    Ok(writer.output)
}

/// Exact number of bytes [`encode_with`] produces for `tag`.
pub fn encoded_len(tag: &NbtTag, unnamed_root: bool) -> usize {
    let name_len = if unnamed_root { 0 } else { 2 + tag.name.len() };
    1 + name_len + payload_len(&tag.value)
}

fn payload_len(value: &NbtValue) -> usize {
    match value {
        NbtValue::Byte(_) => 1,
        NbtValue::Short(_) => 2,
        NbtValue::Int(_) | NbtValue::Float(_) => 4,
        NbtValue::Long(_) | NbtValue::Double(_) => 8,
        NbtValue::ByteArray(array) => 4 + array.len(),
        NbtValue::String(string) => 2 + string.len(),
        NbtValue::List(list) => 5 + list.iter().map(payload_len).sum::<usize>(),
        NbtValue::Compound(compound) => {
            1 + compound
                .iter()
                .map(|(name, value)| 3 + name.len() + payload_len(value))
                .sum::<usize>()
        }
        NbtValue::IntArray(array) => 4 + 4 * array.len(),
        NbtValue::LongArray(array) => 4 + 8 * array.len(),
    }
}

macro_rules! put_number {
    ( $($name:ident => $ty:ty, $be:ident, $le:ident;)* ) => {
        $(
            #[inline]
            fn $name(&mut self, value: $ty) {
                match self.endianness {
                    Endianness::Big => self.output.$be(value),
                    Endianness::Little => self.output.$le(value),
                }
            }
        )*
    };
}

struct Writer {
    output: Vec<u8>,
    endianness: Endianness,
    max_depth: usize,
}

impl Writer {
    put_number! {
        put_u16 => u16, put_u16, put_u16_le;
        put_i16 => i16, put_i16, put_i16_le;
        put_i32 => i32, put_i32, put_i32_le;
        put_i64 => i64, put_i64, put_i64_le;
        put_f32 => f32, put_f32, put_f32_le;
        put_f64 => f64, put_f64, put_f64_le;
    }

    #[inline]
    fn put_tag_type(&mut self, tag: TagType) {
        self.output.put_u8(tag.into());
    }

    fn put_string(&mut self, string: &str) -> Result<(), EncodeError> {
        let len = u16::try_from(string.len())
            .map_err(|_| EncodeError::StringTooLong { len: string.len() })?;
        self.put_u16(len);
        self.output.put_slice(string.as_bytes());
        Ok(())
    }

    fn put_len(&mut self, len: usize) -> Result<(), EncodeError> {
        let len = i32::try_from(len).map_err(|_| EncodeError::ArrayTooLong { len })?;
        self.put_i32(len);
        Ok(())
    }

    fn enter(&self, depth: usize) -> Result<usize, EncodeError> {
        let depth = depth + 1;
        if depth > self.max_depth {
            Err(EncodeError::DepthExceeded {
                max: self.max_depth,
            })
        } else {
            Ok(depth)
        }
    }

    fn put_payload(&mut self, value: &NbtValue, depth: usize) -> Result<(), EncodeError> {
        match value {
            NbtValue::Byte(v) => self.output.put_i8(*v),
            NbtValue::Short(v) => self.put_i16(*v),
            NbtValue::Int(v) => self.put_i32(*v),
            NbtValue::Long(v) => self.put_i64(*v),
            NbtValue::Float(v) => self.put_f32(*v),
            NbtValue::Double(v) => self.put_f64(*v),
            NbtValue::ByteArray(array) => {
                self.put_len(array.len())?;
                self.output.extend(array.iter().map(|&b| b as u8));
            }
            NbtValue::String(string) => self.put_string(string)?,
            NbtValue::List(list) => self.put_list(list, depth)?,
            NbtValue::Compound(compound) => self.put_compound(compound, depth)?,
            NbtValue::IntArray(array) => {
                self.put_len(array.len())?;
                for &v in array {
                    self.put_i32(v);
                }
            }
            NbtValue::LongArray(array) => {
                self.put_len(array.len())?;
                for &v in array {
                    self.put_i64(v);
                }
            }
        }
        Ok(())
    }

    fn put_list(&mut self, list: &NbtList, depth: usize) -> Result<(), EncodeError> {
        let depth = self.enter(depth)?;
        let expected = list.element_type();
        if let Some((index, found)) = list
            .iter()
            .map(NbtValue::tag_type)
            .enumerate()
            .find(|&(_, found)| found != expected)
        {
            return Err(SchemaError::new(
                format!("[{index}]"),
                SchemaErrorKind::HeterogeneousList { expected, found },
            )
            .into());
        }

        self.put_tag_type(expected);
        self.put_len(list.len())?;
        for item in list {
            self.put_payload(item, depth)?;
        }
        Ok(())
    }

    fn put_compound(&mut self, compound: &NbtCompound, depth: usize) -> Result<(), EncodeError> {
        let depth = self.enter(depth)?;
        for (name, value) in compound.iter() {
            self.put_tag_type(value.tag_type());
            self.put_string(name)?;
            self.put_payload(value, depth)?;
        }
        self.put_tag_type(TagType::End);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::decode::decode;

    fn sample() -> NbtTag {
        let mut list = NbtList::new();
        list.push(NbtCompound::new().with("id", "minecraft:stone").unwrap()).unwrap();
        list.push(NbtCompound::new()).unwrap();

        let root = NbtCompound::new()
            .with("byte", -1i8)
            .unwrap()
            .with("short", 256i16)
            .unwrap()
            .with("int", i32::MIN)
            .unwrap()
            .with("long", i64::MAX)
            .unwrap()
            .with("float", 0.1f32)
            .unwrap()
            .with("double", -2.5e300f64)
            .unwrap()
            .with("bytes", vec![0i8, -128, 127])
            .unwrap()
            .with("string", "héllo wörld")
            .unwrap()
            .with("items", list)
            .unwrap()
            .with("empty", NbtList::with_type(TagType::Long))
            .unwrap()
            .with("ints", vec![1i32, -1])
            .unwrap()
            .with("longs", Vec::<i64>::new())
            .unwrap();
        NbtTag::new("Level", root)
    }

    #[test]
    fn sleep_timer() {
        let root = NbtCompound::new().with("SleepTimer", 0i16).unwrap();
        let bytes = encode(&NbtTag::new("", root), Endianness::Big).unwrap();
        #[rustfmt::skip]
        let expected = [
            0x0a, 0x00, 0x00,
            0x02, 0x00, 0x0a, b'S', b'l', b'e', b'e', b'p', b'T', b'i', b'm', b'e', b'r', 0x00, 0x00,
            0x00,
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn round_trip_both_endiannesses() {
        let tag = sample();
        for endianness in [Endianness::Big, Endianness::Little] {
            let bytes = encode(&tag, endianness).unwrap();
            assert_eq!(bytes.len(), encoded_len(&tag, false));
            assert_eq!(decode(&bytes, endianness).unwrap(), tag);
        }
    }

    #[test]
    fn byte_order() {
        let tag = NbtTag::new("", 1i32);
        assert_eq!(
            encode(&tag, Endianness::Big).unwrap(),
            [0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01]
        );
        assert_eq!(
            encode(&tag, Endianness::Little).unwrap(),
            [0x03, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn unnamed_root() {
        let tag = NbtTag::new("ignored", NbtCompound::new());
        let options = EncodeOptions {
            unnamed_root: true,
            ..Default::default()
        };
        assert_eq!(encode_with(&tag, &options).unwrap(), [0x0a, 0x00]);
        assert_eq!(encoded_len(&tag, true), 2);
    }

    #[test]
    fn heterogeneous_list() {
        let list = NbtList {
            tag: TagType::Int,
            items: vec![NbtValue::Int(1), NbtValue::Long(2)],
        };
        let err = encode(&NbtTag::new("", list), Endianness::Big).unwrap_err();
        let EncodeError::Schema(err) = err else {
            panic!("expected schema error, got {err:?}");
        };
        assert_eq!(err.path, "[1]");
        assert_eq!(
            err.kind,
            SchemaErrorKind::HeterogeneousList {
                expected: TagType::Int,
                found: TagType::Long,
            }
        );

        let untyped = NbtList {
            tag: TagType::End,
            items: vec![NbtValue::Byte(1)],
        };
        assert!(encode(&NbtTag::new("", untyped), Endianness::Big).is_err());
    }

    #[test]
    fn string_too_long() {
        let tag = NbtTag::new("", "x".repeat(usize::from(u16::MAX) + 1));
        let err = encode(&tag, Endianness::Big).unwrap_err();
        assert!(matches!(err, EncodeError::StringTooLong { len: 65536 }), "{err:?}");

        let tag = NbtTag::new("", "x".repeat(usize::from(u16::MAX)));
        assert!(encode(&tag, Endianness::Big).is_ok());
    }

    #[test]
    fn depth_limit() {
        let mut value = NbtValue::Compound(NbtCompound::new());
        for _ in 0..10 {
            value = NbtValue::Compound(NbtCompound::new().with("", value).unwrap());
        }
        let tag = NbtTag::new("", value);
        let options = EncodeOptions {
            max_depth: 5,
            ..Default::default()
        };
        let err = encode_with(&tag, &options).unwrap_err();
        assert!(matches!(err, EncodeError::DepthExceeded { max: 5 }), "{err:?}");
        assert!(encode(&tag, Endianness::Big).is_ok());
    }
}
