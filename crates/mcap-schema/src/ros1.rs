use serde_json::{Value, json};

use crate::definition::PrimitiveType;
use crate::error::SchemaError;
use crate::source::{ByteCursor, Endian, WireSource, float_value, utf8_value};

/// ROS 1 serialization: packed little-endian, no alignment, strings and
/// dynamic arrays prefixed by a `u32` length.
pub(crate) struct Ros1Source<'a> {
    cursor: ByteCursor<'a>,
}

impl<'a> Ros1Source<'a> {
    pub(crate) fn new(payload: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::new(payload),
        }
    }
}

fn read_len(c: &mut ByteCursor<'_>) -> Result<usize, SchemaError> {
    Ok(c.read_u32(Endian::Little)? as usize)
}

impl WireSource for Ros1Source<'_> {
    fn read_primitive(&mut self, ty: PrimitiveType, field: &str) -> Result<Value, SchemaError> {
        const LE: Endian = Endian::Little;
        let c = &mut self.cursor;
        Ok(match ty {
            PrimitiveType::Bool => Value::Bool(c.read_u8()? != 0),
            PrimitiveType::Int8 => json!(i8::from_le_bytes([c.read_u8()?])),
            PrimitiveType::Uint8 => json!(c.read_u8()?),
            PrimitiveType::Int16 => json!(c.read_i16(LE)?),
            PrimitiveType::Uint16 => json!(c.read_u16(LE)?),
            PrimitiveType::Int32 => json!(c.read_i32(LE)?),
            PrimitiveType::Uint32 => json!(c.read_u32(LE)?),
            PrimitiveType::Int64 => json!(c.read_i64(LE)?),
            PrimitiveType::Uint64 => json!(c.read_u64(LE)?),
            PrimitiveType::Float32 => float_value(f64::from(c.read_f32(LE)?)),
            PrimitiveType::Float64 => float_value(c.read_f64(LE)?),
            PrimitiveType::String => {
                let len = read_len(c)?;
                utf8_value(c.take(len)?, field)?
            }
            PrimitiveType::Time => {
                let sec = c.read_u32(LE)?;
                let nsec = c.read_u32(LE)?;
                json!({ "sec": sec, "nsec": nsec })
            }
            // Same layout as time, signed.
            PrimitiveType::Duration => {
                let sec = c.read_i32(LE)?;
                let nsec = c.read_i32(LE)?;
                json!({ "sec": sec, "nsec": nsec })
            }
        })
    }

    fn read_sequence_len(&mut self) -> Result<usize, SchemaError> {
        read_len(&mut self.cursor)
    }

    fn remaining(&self) -> usize {
        self.cursor.remaining()
    }
}
