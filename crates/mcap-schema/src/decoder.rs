use std::sync::Arc;

use serde_json::Value;

use crate::cdr::CdrSource;
use crate::compile::CompiledSchema;
use crate::definition::{MessageDefinition, parse_definitions};
use crate::error::SchemaError;
use crate::format::SchemaFormat;
use crate::ros1::Ros1Source;
use crate::source::decode_root;

/// A channel's payload decoder, resolved once from its schema.
///
/// The variant set is closed and mirrors [`SchemaFormat`]. Clones share
/// the compiled schema behind an `Arc`.
///
/// # Example
///
/// ```
/// use mcap_schema::{MessageDecoder, SchemaFormat};
///
/// let decoder = MessageDecoder::resolve(SchemaFormat::Ros1, "pkg/Count", b"uint32 n").unwrap();
/// let value = decoder.decode(&7u32.to_le_bytes()).unwrap();
/// assert_eq!(value, serde_json::json!({ "n": 7 }));
/// ```
#[derive(Clone, Debug)]
pub enum MessageDecoder {
    Ros1(Ros1Decoder),
    Ros2(Ros2Decoder),
}

/// Packed little-endian ROS 1 payloads.
#[derive(Clone, Debug)]
pub struct Ros1Decoder {
    schema: Arc<CompiledSchema>,
}

/// CDR-encoded ROS 2 payloads.
#[derive(Clone, Debug)]
pub struct Ros2Decoder {
    schema: Arc<CompiledSchema>,
}

impl MessageDecoder {
    /// Parse and compile `schema` as `format`.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::SchemaNotUtf8`] if the definition text is binary.
    /// - [`SchemaError::InvalidDefinition`] for unparseable lines.
    /// - [`SchemaError::UnresolvedType`] if a field names a type the
    ///   schema never defines.
    pub fn resolve(
        format: SchemaFormat,
        schema_name: &str,
        schema: &[u8],
    ) -> Result<Self, SchemaError> {
        let text = std::str::from_utf8(schema).map_err(|_| SchemaError::SchemaNotUtf8)?;
        let definitions = parse_definitions(text, format)?;
        let schema = Arc::new(CompiledSchema::compile(definitions, schema_name, format)?);
        Ok(match format {
            SchemaFormat::Ros1 => Self::Ros1(Ros1Decoder { schema }),
            SchemaFormat::Ros2 => Self::Ros2(Ros2Decoder { schema }),
        })
    }

    /// Resolve from the string tag carried in a channel record.
    ///
    /// # Errors
    ///
    /// [`SchemaError::UnsupportedFormat`] for tags other than `ros1` and
    /// `ros2`, plus everything [`resolve`](Self::resolve) returns.
    pub fn resolve_tag(
        format: &str,
        schema_name: &str,
        schema: &[u8],
    ) -> Result<Self, SchemaError> {
        Self::resolve(format.parse()?, schema_name, schema)
    }

    /// Decode one payload into a JSON object keyed by field name.
    ///
    /// Bytes left over after the root message is satisfied are ignored,
    /// matching what ROS tooling accepts.
    ///
    /// # Errors
    ///
    /// Any decoding-group [`SchemaError`] when the payload does not match
    /// the schema.
    pub fn decode(&self, payload: &[u8]) -> Result<Value, SchemaError> {
        match self {
            Self::Ros1(d) => decode_root(&d.schema, &mut Ros1Source::new(payload)),
            Self::Ros2(d) => decode_root(&d.schema, &mut CdrSource::new(payload)?),
        }
    }

    #[must_use]
    pub fn format(&self) -> SchemaFormat {
        match self {
            Self::Ros1(_) => SchemaFormat::Ros1,
            Self::Ros2(_) => SchemaFormat::Ros2,
        }
    }

    /// The parsed definitions, root first.
    #[must_use]
    pub fn definitions(&self) -> &[MessageDefinition] {
        match self {
            Self::Ros1(Ros1Decoder { schema }) | Self::Ros2(Ros2Decoder { schema }) => {
                &schema.definitions
            }
        }
    }
}
