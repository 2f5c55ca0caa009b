use serde_json::{Value, json};

use crate::definition::PrimitiveType;
use crate::error::SchemaError;
use crate::source::{ByteCursor, Endian, WireSource, float_value, utf8_value};

const ENCAPSULATION_LEN: usize = 4;

/// XCDR1 plain encoding as ROS 2 middleware writes it.
///
/// ```text
/// ┌────────┬────────┬──────────────┬─────────────────────────────┐
/// │ 0x00   │ 0x00   │ options (2)  │ body, big-endian            │
/// │ 0x00   │ 0x01   │ options (2)  │ body, little-endian         │
/// └────────┴────────┴──────────────┴─────────────────────────────┘
/// ```
///
/// Every primitive is aligned to its own size, measured from the end
/// of the encapsulation header. Strings carry a `u32` length that counts
/// the trailing NUL.
pub(crate) struct CdrSource<'a> {
    cursor: ByteCursor<'a>,
    endian: Endian,
}

impl<'a> CdrSource<'a> {
    pub(crate) fn new(payload: &'a [u8]) -> Result<Self, SchemaError> {
        let Some((header, body)) = payload.split_first_chunk::<ENCAPSULATION_LEN>() else {
            return Err(SchemaError::InvalidEncapsulation {
                header: payload.to_vec(),
            });
        };
        let endian = match header[..2] {
            [0x00, 0x00] => Endian::Big,
            [0x00, 0x01] => Endian::Little,
            _ => {
                return Err(SchemaError::InvalidEncapsulation {
                    header: header.to_vec(),
                });
            }
        };
        Ok(Self {
            cursor: ByteCursor::new(body),
            endian,
        })
    }

    fn read_u32_aligned(&mut self) -> Result<u32, SchemaError> {
        self.cursor.align(4)?;
        self.cursor.read_u32(self.endian)
    }
}

impl WireSource for CdrSource<'_> {
    fn read_primitive(&mut self, ty: PrimitiveType, field: &str) -> Result<Value, SchemaError> {
        let e = self.endian;
        let c = &mut self.cursor;
        Ok(match ty {
            PrimitiveType::Bool => Value::Bool(c.read_u8()? != 0),
            PrimitiveType::Int8 => json!(i8::from_le_bytes([c.read_u8()?])),
            PrimitiveType::Uint8 => json!(c.read_u8()?),
            PrimitiveType::Int16 => {
                c.align(2)?;
                json!(c.read_i16(e)?)
            }
            PrimitiveType::Uint16 => {
                c.align(2)?;
                json!(c.read_u16(e)?)
            }
            PrimitiveType::Int32 => {
                c.align(4)?;
                json!(c.read_i32(e)?)
            }
            PrimitiveType::Uint32 => {
                c.align(4)?;
                json!(c.read_u32(e)?)
            }
            PrimitiveType::Int64 => {
                c.align(8)?;
                json!(c.read_i64(e)?)
            }
            PrimitiveType::Uint64 => {
                c.align(8)?;
                json!(c.read_u64(e)?)
            }
            PrimitiveType::Float32 => {
                c.align(4)?;
                float_value(f64::from(c.read_f32(e)?))
            }
            PrimitiveType::Float64 => {
                c.align(8)?;
                float_value(c.read_f64(e)?)
            }
            PrimitiveType::String => {
                c.align(4)?;
                let len = c.read_u32(e)? as usize;
                let raw = c.take(len)?;
                let text = raw.strip_suffix(&[0]).unwrap_or(raw);
                utf8_value(text, field)?
            }
            // Not produced by the ROS 2 parser; laid out like the
            // builtin_interfaces types if a caller builds one by hand.
            PrimitiveType::Time | PrimitiveType::Duration => {
                c.align(4)?;
                let sec = c.read_i32(e)?;
                let nanosec = c.read_u32(e)?;
                json!({ "sec": sec, "nanosec": nanosec })
            }
        })
    }

    fn read_sequence_len(&mut self) -> Result<usize, SchemaError> {
        Ok(self.read_u32_aligned()? as usize)
    }

    fn remaining(&self) -> usize {
        self.cursor.remaining()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_selects_endianness() {
        let mut le = CdrSource::new(&[0x00, 0x01, 0, 0, 0x2A, 0, 0, 0]).unwrap();
        assert_eq!(le.read_primitive(PrimitiveType::Uint32, "x").unwrap(), json!(42));

        let mut be = CdrSource::new(&[0x00, 0x00, 0, 0, 0, 0, 0, 0x2A]).unwrap();
        assert_eq!(be.read_primitive(PrimitiveType::Uint32, "x").unwrap(), json!(42));
    }

    #[test]
    fn bad_header_rejected() {
        assert!(matches!(
            CdrSource::new(&[0x01, 0x01, 0, 0]),
            Err(SchemaError::InvalidEncapsulation { .. })
        ));
        assert!(matches!(
            CdrSource::new(&[0x00]),
            Err(SchemaError::InvalidEncapsulation { header }) if header == vec![0x00]
        ));
    }

    #[test]
    fn alignment_is_relative_to_body() {
        // u8 then padding to 4, then u32.
        let payload = [0x00, 0x01, 0, 0, 0x07, 0xFF, 0xFF, 0xFF, 0x05, 0, 0, 0];
        let mut src = CdrSource::new(&payload).unwrap();
        assert_eq!(src.read_primitive(PrimitiveType::Uint8, "a").unwrap(), json!(7));
        assert_eq!(src.read_primitive(PrimitiveType::Uint32, "b").unwrap(), json!(5));
        assert_eq!(src.remaining(), 0);
    }

    #[test]
    fn string_drops_terminator() {
        let payload = [0x00, 0x01, 0, 0, 3, 0, 0, 0, b'h', b'i', 0];
        let mut src = CdrSource::new(&payload).unwrap();
        assert_eq!(src.read_primitive(PrimitiveType::String, "s").unwrap(), json!("hi"));
    }
}
