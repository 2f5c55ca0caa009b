use serde_json::{Map, Value};

use crate::compile::{CompiledField, CompiledSchema, WireType};
use crate::definition::{ArrayKind, PrimitiveType};
use crate::error::SchemaError;

/// Deepest message nesting a payload may reach before decoding stops.
pub(crate) const MAX_NESTING: usize = 64;

/// Array elements allowed beyond one per payload byte. Only elements
/// that occupy no bytes (empty messages) can draw on it.
pub(crate) const ZERO_WIDTH_ELEMENTS: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Endian {
    Little,
    Big,
}

/// Bounds-checked read cursor shared by both dialects.
pub(crate) struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

macro_rules! read_number {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            pub(crate) fn $name(&mut self, endian: Endian) -> Result<$ty, SchemaError> {
                let bytes = self.take_array::<{ std::mem::size_of::<$ty>() }>()?;
                Ok(match endian {
                    Endian::Little => <$ty>::from_le_bytes(bytes),
                    Endian::Big => <$ty>::from_be_bytes(bytes),
                })
            }
        )*
    };
}

impl<'a> ByteCursor<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], SchemaError> {
        if n > self.remaining() {
            return Err(SchemaError::UnexpectedEof {
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], SchemaError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, SchemaError> {
        Ok(self.take(1)?[0])
    }

    read_number! {
        read_u16 => u16,
        read_i16 => i16,
        read_u32 => u32,
        read_i32 => i32,
        read_u64 => u64,
        read_i64 => i64,
        read_f32 => f32,
        read_f64 => f64,
    }

    /// Skip padding so the position is a multiple of `n`.
    pub(crate) fn align(&mut self, n: usize) -> Result<(), SchemaError> {
        let padding = (n - self.pos % n) % n;
        self.take(padding).map(|_| ())
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}

pub(crate) fn float_value(value: f64) -> Value {
    serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
}

pub(crate) fn utf8_value(bytes: &[u8], field: &str) -> Result<Value, SchemaError> {
    std::str::from_utf8(bytes)
        .map(|s| Value::String(s.to_owned()))
        .map_err(|_| SchemaError::InvalidUtf8 {
            field: field.to_string(),
        })
}

/// The per-dialect half of decoding: how one primitive or one sequence
/// length is laid out on the wire. The schema walk is shared.
pub(crate) trait WireSource {
    fn read_primitive(&mut self, ty: PrimitiveType, field: &str) -> Result<Value, SchemaError>;

    fn read_sequence_len(&mut self) -> Result<usize, SchemaError>;

    fn remaining(&self) -> usize;
}

/// Decode the root message of `schema` from `src`.
///
/// Every array element decoded, at any depth, is charged against a budget
/// of one element per payload byte plus [`ZERO_WIDTH_ELEMENTS`], so a
/// schema of fixed arrays over empty messages cannot expand a short
/// payload without bound.
pub(crate) fn decode_root(
    schema: &CompiledSchema,
    src: &mut impl WireSource,
) -> Result<Value, SchemaError> {
    let limit = src.remaining().saturating_add(ZERO_WIDTH_ELEMENTS);
    let mut walk = Walk {
        schema,
        elements_left: limit,
        limit,
    };
    walk.message(0, src, 0)
}

struct Walk<'s> {
    schema: &'s CompiledSchema,
    elements_left: usize,
    limit: usize,
}

impl Walk<'_> {
    fn message(
        &mut self,
        index: usize,
        src: &mut impl WireSource,
        depth: usize,
    ) -> Result<Value, SchemaError> {
        if depth > MAX_NESTING {
            return Err(SchemaError::NestingTooDeep { limit: MAX_NESTING });
        }

        let schema = self.schema;
        let mut object = Map::new();

        for field in &schema.messages[index].fields {
            let value = match field.array {
                None => self.single(field, src, depth)?,
                Some(ArrayKind::Fixed(len)) => self.array(field, src, depth, len)?,
                Some(ArrayKind::Dynamic) => {
                    let len = src.read_sequence_len()?;
                    // Elements are at least one byte wide, empty messages aside.
                    if len > src.remaining() {
                        return Err(SchemaError::ArrayTooLong {
                            len,
                            remaining: src.remaining(),
                        });
                    }
                    self.array(field, src, depth, len)?
                }
            };
            object.insert(field.name.clone(), value);
        }

        Ok(Value::Object(object))
    }

    fn single(
        &mut self,
        field: &CompiledField,
        src: &mut impl WireSource,
        depth: usize,
    ) -> Result<Value, SchemaError> {
        match field.ty {
            WireType::Primitive(p) => src.read_primitive(p, &field.name),
            WireType::Message(index) => self.message(index, src, depth + 1),
        }
    }

    fn array(
        &mut self,
        field: &CompiledField,
        src: &mut impl WireSource,
        depth: usize,
        len: usize,
    ) -> Result<Value, SchemaError> {
        if len > self.elements_left {
            return Err(SchemaError::TooManyElements { limit: self.limit });
        }
        self.elements_left -= len;

        let mut items = Vec::with_capacity(len.min(src.remaining()));
        for _ in 0..len {
            items.push(self.single(field, src, depth)?);
        }
        Ok(Value::Array(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_both_endians() {
        let bytes = [0x01, 0x02, 0x01, 0x02];
        let mut c = ByteCursor::new(&bytes);
        assert_eq!(c.read_u16(Endian::Little).unwrap(), 0x0201);
        assert_eq!(c.read_u16(Endian::Big).unwrap(), 0x0102);
        assert_eq!(c.remaining(), 0);
    }

    #[test]
    fn eof_reports_shortfall() {
        let bytes = [0u8; 3];
        let mut c = ByteCursor::new(&bytes);
        assert!(matches!(
            c.read_u64(Endian::Little),
            Err(SchemaError::UnexpectedEof {
                offset: 0,
                needed: 5
            })
        ));
    }

    #[test]
    fn align_skips_padding() {
        let bytes = [0u8; 8];
        let mut c = ByteCursor::new(&bytes);
        c.read_u8().unwrap();
        c.align(4).unwrap();
        assert_eq!(c.remaining(), 4);
        c.align(4).unwrap();
        assert_eq!(c.remaining(), 4);
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert_eq!(float_value(f64::NAN), Value::Null);
        assert_eq!(float_value(1.5), serde_json::json!(1.5));
    }
}
