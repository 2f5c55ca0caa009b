use mcap_schema::SchemaError;
use mcap_wire::{RecordKind, WireError};

use crate::dispatch::ProtocolState;

/// Errors that abort a retrieval.
///
/// Every variant is fatal: a retrieval that fails returns no messages,
/// and an empty `Ok` always means "well-formed, nothing in range".
///
/// Error hierarchy:
///
/// ```text
///   ProtocolError
///   ├── framing
///   │   ├── UnsupportedVersion        ← bad magic, or version != 1
///   │   ├── TrailingDataAfterFooter   ← bytes after the trailing magic
///   │   ├── TruncatedStream           ← transport ended before Done
///   │   └── Malformed(WireError)      ← tokenizer rejected a record
///   ├── channels
///   │   ├── UnknownChannel            ← Message before its ChannelInfo
///   │   ├── ConflictingChannelInfo    ← same id, different definition
///   │   ├── UnsupportedSchemaFormat   ← format tag not ros1 / ros2
///   │   └── InvalidSchema             ← schema text did not parse
///   ├── payloads
///   │   └── DecodeFailed              ← message bytes do not fit schema
///   ├── chunks
///   │   ├── DecompressionFailed       ← codec error or size mismatch
///   │   ├── NestedChunkNotSupported   ← Chunk inside a Chunk
///   │   └── UnexpectedFooter          ← Footer inside a Chunk
///   ├── UnsupportedRecordKind         ← IndexData / ChunkInfo
///   ├── Transport(TransportError)     ← byte source failed
///   └── Poisoned                      ← dispatcher used after failure
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The leading or trailing magic is not a supported format marker.
    /// `found` is the version digit, or `None` when the marker bytes
    /// themselves were wrong.
    #[error("{}", describe_magic(.found))]
    UnsupportedVersion { found: Option<u8> },

    #[error("message for channel {channel_id} with no prior channel info")]
    UnknownChannel { channel_id: u32 },

    #[error("differing channel infos for channel {channel_id}")]
    ConflictingChannelInfo { channel_id: u32 },

    #[error("channel {channel_id} uses unsupported schema format {format:?}")]
    UnsupportedSchemaFormat { channel_id: u32, format: String },

    #[error("channel {channel_id} has an invalid schema")]
    InvalidSchema {
        channel_id: u32,
        #[source]
        source: SchemaError,
    },

    #[error("failed to decode message on {topic} (channel {channel_id})")]
    DecodeFailed {
        channel_id: u32,
        topic: String,
        #[source]
        source: SchemaError,
    },

    #[error("failed to decompress {compression:?} chunk: {reason}")]
    DecompressionFailed { compression: String, reason: String },

    #[error("{kind} records are not supported")]
    UnsupportedRecordKind { kind: RecordKind },

    #[error("chunk contains a nested chunk")]
    NestedChunkNotSupported,

    #[error("unexpected footer record inside a chunk")]
    UnexpectedFooter,

    #[error("{extra} bytes of data after the trailing magic")]
    TrailingDataAfterFooter { extra: usize },

    #[error("stream ended while {state} with {buffered} unconsumed bytes")]
    TruncatedStream {
        state: ProtocolState,
        buffered: usize,
    },

    #[error(transparent)]
    Malformed(#[from] WireError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("dispatcher already failed")]
    Poisoned,
}

fn describe_magic(found: &Option<u8>) -> String {
    match found {
        Some(version) => format!("unsupported format version {version}"),
        None => "invalid magic".to_string(),
    }
}

/// Failures of the byte source, kept apart from protocol violations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport I/O failed")]
    Io(#[from] std::io::Error),

    /// Reported by whatever feeds a channel transport, e.g. an HTTP
    /// body that was cut off.
    #[error("transport failed: {reason}")]
    Disconnected { reason: String },
}

/// A `--start` / `--end` style time argument that is not
/// `<sec>[.<fraction>]`.
#[derive(Debug, thiserror::Error)]
#[error("invalid time {input:?}: expected <sec>[.<fraction>] with at most 9 fractional digits")]
pub struct ParseTimeError {
    pub input: String,
}
