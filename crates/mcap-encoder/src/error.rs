use mcap_wire::{Compression, WireError};

/// Errors that can occur while building a container stream.
///
/// ```text
///   EncodeError
///   ├── CompressFailed    ← lz4 / zstd rejected a chunk body
///   ├── NoChunkToModify   ← chunk modifier called after a non-chunk
///   ├── Wire(WireError)   ← a field too long for its length prefix
///   └── Io(std::io::Error)
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("{algorithm:?} compression failed: {reason}")]
    CompressFailed {
        algorithm: Compression,
        reason: String,
    },

    #[error("{modifier} called but the last item added is not a chunk")]
    NoChunkToModify { modifier: &'static str },

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
