use crate::kind::RecordKind;

/// Errors raised while tokenizing or writing container records.
///
/// These are framing-level failures: the bytes do not form a valid
/// magic marker or record envelope, or a record body cannot be split
/// into its fields. They carry no knowledge of channels, schemas or
/// time windows; the stream layer wraps them when it needs to.
///
/// ```text
///   WireError
///   ├── UnexpectedEof      ← a field ran past the end of its body
///   ├── InvalidMagic       ← leading/trailing marker bytes are wrong
///   ├── UnknownOpcode      ← record opcode outside the known set
///   ├── RecordTooLarge     ← declared body length exceeds the limit
///   ├── InvalidUtf8        ← string field is not UTF-8
///   ├── TrailingBodyBytes  ← fixed-layout body longer than its fields
///   ├── FieldTooLong       ← writer given a field over u32::MAX bytes
///   └── Io                 ← from the underlying writer
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Input ended before a complete field could be read.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// Magic marker bytes did not match `\x89MCAP<digit>\r\n`.
    #[error("invalid magic marker: got {found:02X?}")]
    InvalidMagic { found: Vec<u8> },

    /// Record opcode is not one of the six known kinds.
    #[error("unknown record opcode {opcode:#04X}")]
    UnknownOpcode { opcode: u8 },

    /// A record declared a body larger than the reader accepts.
    #[error("{kind} record body of {len} bytes exceeds limit of {limit} bytes")]
    RecordTooLarge {
        kind: RecordKind,
        len: u64,
        limit: u64,
    },

    /// A string field contained invalid UTF-8.
    #[error("invalid UTF-8 in field {field}")]
    InvalidUtf8 { field: &'static str },

    /// A fixed-layout body had bytes left over after its last field.
    #[error("{kind} record has {extra} unread body bytes")]
    TrailingBodyBytes { kind: RecordKind, extra: usize },

    /// A length-prefixed field is too long for its `u32` prefix.
    #[error("field of {len} bytes does not fit a u32 length prefix")]
    FieldTooLong { len: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
