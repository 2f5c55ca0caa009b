use mcap_wire::reader::DEFAULT_MAX_RECORD_LEN;

/// Limits and buffer sizes for one retrieval.
///
/// ```text
/// ┌─────────────────────────────┬─────────┬──────────────────────────────────────┐
/// │ Field                       │ Default │ Purpose                              │
/// ├─────────────────────────────┼─────────┼──────────────────────────────────────┤
/// │ max_record_len              │ 64 MiB  │ Largest record body the tokenizer    │
/// │                             │         │ will wait for                        │
/// │ max_chunk_decompressed_size │ 256 MiB │ Largest declared chunk size that     │
/// │                             │         │ will be allocated                    │
/// │ compaction_threshold        │ 64 KiB  │ Consumed bytes the arena tolerates   │
/// │                             │         │ before shifting its tail down        │
/// │ read_chunk_size             │ 64 KiB  │ Increment size for reader transports │
/// └─────────────────────────────┴─────────┴──────────────────────────────────────┘
/// ```
///
/// Both size limits turn hostile length fields into errors instead of
/// allocations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    pub max_record_len: u64,
    pub max_chunk_decompressed_size: u64,
    pub compaction_threshold: usize,
    pub read_chunk_size: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_record_len: DEFAULT_MAX_RECORD_LEN,
            max_chunk_decompressed_size: 256 * 1024 * 1024,
            compaction_threshold: 64 * 1024,
            read_chunk_size: 64 * 1024,
        }
    }
}
