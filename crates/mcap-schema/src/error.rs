/// Errors from schema resolution and message decoding.
///
/// The first group fires once per channel, when its schema is parsed;
/// the second fires per message, when a payload does not match the
/// schema it claims.
///
/// ```text
/// ┌─────────────────────────────────────────────────────────┐
/// │ SchemaError                                             │
/// │  resolution                                             │
/// │   ├── UnsupportedFormat   ← tag is not ros1 / ros2      │
/// │   ├── SchemaNotUtf8       ← definition text is binary   │
/// │   ├── InvalidDefinition   ← a line could not be parsed  │
/// │   └── UnresolvedType      ← field names a missing type  │
/// │  decoding                                               │
/// │   ├── UnexpectedEof       ← payload shorter than schema │
/// │   ├── InvalidUtf8         ← string field is binary      │
/// │   ├── InvalidEncapsulation← bad CDR header              │
/// │   ├── ArrayTooLong        ← length prefix exceeds data  │
/// │   ├── TooManyElements     ← arrays outgrow the payload  │
/// │   └── NestingTooDeep      ← recursive type ran away     │
/// └─────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("unsupported schema format {format:?}")]
    UnsupportedFormat { format: String },

    #[error("schema text is not valid UTF-8")]
    SchemaNotUtf8,

    /// `line` is 1-based within the whole schema text.
    #[error("invalid definition at line {line}: {reason}")]
    InvalidDefinition { line: usize, reason: String },

    #[error("type {type_name:?} is not defined in the schema")]
    UnresolvedType { type_name: String },

    /// The payload ended before the schema was satisfied.
    #[error("payload ended at offset {offset}, {needed} more bytes needed")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("invalid UTF-8 in string field {field}")]
    InvalidUtf8 { field: String },

    /// CDR payloads start with `0x00 0x00` (big-endian) or `0x00 0x01`
    /// (little-endian) followed by two option bytes.
    #[error("invalid CDR encapsulation header {header:02X?}")]
    InvalidEncapsulation { header: Vec<u8> },

    #[error("array length {len} exceeds the {remaining} bytes left in the payload")]
    ArrayTooLong { len: usize, remaining: usize },

    /// Arrays across the whole message may hold one element per payload
    /// byte, plus a small allowance for elements that occupy no bytes.
    #[error("arrays in this payload exceed {limit} elements in total")]
    TooManyElements { limit: usize },

    #[error("message nesting exceeds {limit} levels")]
    NestingTooDeep { limit: usize },
}
