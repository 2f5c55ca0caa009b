use mcap_wire::{ChannelInfo, ChunkRecord, Compression, Footer, Magic, MessageRecord, Record};

use crate::compression;
use crate::error::EncodeError;

/// Container encoder: builds a complete stream from channels, messages
/// and chunks.
///
/// Methods append to an internal list and return `&mut Self` for
/// chaining. Chunk modifiers such as
/// [`with_declared_size`](Self::with_declared_size) act on the most
/// recently added chunk.
///
/// The defaults produce a well-formed stream. Every framing element can
/// be overridden or dropped so tests can build the malformed inputs a
/// reader has to reject.
///
/// # Usage
///
/// ```rust
/// use mcap_encoder::McapEncoder;
/// use mcap_wire::Compression;
///
/// let stream = McapEncoder::new()
///     .add_channel(1, "/chatter", "ros1", "std_msgs/String", b"string data")
///     .add_chunk(Compression::Lz4, |chunk| {
///         chunk.add_message(1, 1_000_000_000, b"\x02\x00\x00\x00hi");
///     })
///     .encode()
///     .unwrap();
/// assert_eq!(&stream[1..5], b"MCAP");
/// ```
///
/// # Output layout
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────┐
/// │ [8 bytes]    │ Leading magic (format version)           │
/// │ [N bytes]    │ Records and chunks, in insertion order   │
/// │ [21 bytes]   │ Footer record                            │
/// │ [8 bytes]    │ Trailing magic                           │
/// └──────────────┴──────────────────────────────────────────┘
/// ```
pub struct McapEncoder {
    leading_magic: Option<Magic>,
    items: Vec<PendingItem>,
    footer: Option<Footer>,
    trailing_magic: Option<Magic>,
    next_sequence: u32,
    /// First chunk modifier called with no chunk to act on.
    misuse: Option<&'static str>,
}

enum PendingItem {
    Record(Record),
    Chunk(PendingChunk),
    Raw(Vec<u8>),
}

struct PendingChunk {
    compression: Compression,
    records: Vec<Record>,
    /// Overrides the true decompressed size in the chunk header.
    declared_size: Option<u64>,
    /// Overrides the canonical compression tag.
    tag: Option<String>,
}

impl McapEncoder {
    /// Create an encoder for a format-version-1 stream with a default
    /// footer and trailing magic.
    #[must_use]
    pub fn new() -> Self {
        Self {
            leading_magic: Some(Magic::current()),
            items: Vec::new(),
            footer: Some(Footer::default()),
            trailing_magic: Some(Magic::current()),
            next_sequence: 0,
            misuse: None,
        }
    }

    // ── Record methods ──────────────────────────────────────────────────

    /// Add a ChannelInfo record.
    pub fn add_channel(
        &mut self,
        id: u32,
        topic: &str,
        schema_format: &str,
        schema_name: &str,
        schema: &[u8],
    ) -> &mut Self {
        self.add_channel_info(channel_info(id, topic, schema_format, schema_name, schema))
    }

    pub fn add_channel_info(&mut self, info: ChannelInfo) -> &mut Self {
        self.add_record(Record::ChannelInfo(info))
    }

    /// Add a Message record. Sequence numbers are assigned in insertion
    /// order across the whole stream, chunks included.
    pub fn add_message(&mut self, channel_id: u32, timestamp: u64, data: &[u8]) -> &mut Self {
        let record = message(&mut self.next_sequence, channel_id, timestamp, data);
        self.add_record(record)
    }

    /// Add any record verbatim, including kinds a reader rejects.
    pub fn add_record(&mut self, record: Record) -> &mut Self {
        self.items.push(PendingItem::Record(record));
        self
    }

    /// Append raw bytes at this position in the body.
    pub fn add_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.items.push(PendingItem::Raw(bytes.to_vec()));
        self
    }

    /// Add a Chunk whose records are built by `build`.
    pub fn add_chunk(
        &mut self,
        compression: Compression,
        build: impl FnOnce(&mut ChunkBuilder<'_>),
    ) -> &mut Self {
        let mut builder = ChunkBuilder {
            records: Vec::new(),
            next_sequence: &mut self.next_sequence,
        };
        build(&mut builder);
        let records = builder.records;
        self.items.push(PendingItem::Chunk(PendingChunk {
            compression,
            records,
            declared_size: None,
            tag: None,
        }));
        self
    }

    // ── Chunk modifiers ─────────────────────────────────────────────────

    /// Declare a decompressed size other than the true one on the most
    /// recent chunk.
    pub fn with_declared_size(&mut self, size: u64) -> &mut Self {
        if let Some(chunk) = self.last_chunk("with_declared_size") {
            chunk.declared_size = Some(size);
        }
        self
    }

    /// Write `tag` as the most recent chunk's compression string. The
    /// body is still compressed with the chunk's real algorithm.
    pub fn with_compression_tag(&mut self, tag: &str) -> &mut Self {
        if let Some(chunk) = self.last_chunk("with_compression_tag") {
            chunk.tag = Some(tag.to_string());
        }
        self
    }

    // ── Framing overrides ───────────────────────────────────────────────

    /// Write `version` into the leading magic.
    pub fn format_version(&mut self, version: u8) -> &mut Self {
        self.leading_magic = Some(Magic::new(version));
        self
    }

    pub fn without_leading_magic(&mut self) -> &mut Self {
        self.leading_magic = None;
        self
    }

    pub fn footer(&mut self, footer: Footer) -> &mut Self {
        self.footer = Some(footer);
        self
    }

    pub fn without_footer(&mut self) -> &mut Self {
        self.footer = None;
        self
    }

    /// Write `version` into the trailing magic.
    pub fn trailing_version(&mut self, version: u8) -> &mut Self {
        self.trailing_magic = Some(Magic::new(version));
        self
    }

    pub fn without_trailing_magic(&mut self) -> &mut Self {
        self.trailing_magic = None;
        self
    }

    // ── Encode ──────────────────────────────────────────────────────────

    /// Serialize everything added so far.
    ///
    /// The encoder is not consumed; calling `encode` twice yields the
    /// same bytes.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::NoChunkToModify`] if a chunk modifier was called
    ///   when the last item was not a chunk.
    /// - [`EncodeError::Wire`] if a string or byte field is longer than
    ///   a `u32` length prefix can express.
    /// - [`EncodeError::CompressFailed`] if a chunk body cannot be
    ///   compressed.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        if let Some(modifier) = self.misuse {
            return Err(EncodeError::NoChunkToModify { modifier });
        }

        let mut output = Vec::new();
        if let Some(magic) = self.leading_magic {
            magic.write_to(&mut output)?;
        }

        for item in &self.items {
            match item {
                PendingItem::Record(record) => {
                    record.write_to(&mut output)?;
                }
                PendingItem::Chunk(chunk) => {
                    Record::Chunk(encode_chunk(chunk)?).write_to(&mut output)?;
                }
                PendingItem::Raw(bytes) => output.extend_from_slice(bytes),
            }
        }

        if let Some(footer) = self.footer {
            Record::Footer(footer).write_to(&mut output)?;
        }
        if let Some(magic) = self.trailing_magic {
            magic.write_to(&mut output)?;
        }

        Ok(output)
    }

    // ── Internal helpers ────────────────────────────────────────────────

    fn last_chunk(&mut self, modifier: &'static str) -> Option<&mut PendingChunk> {
        if let Some(PendingItem::Chunk(chunk)) = self.items.last_mut() {
            return Some(chunk);
        }
        self.misuse.get_or_insert(modifier);
        None
    }
}

impl Default for McapEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects the records of one chunk. Obtained from
/// [`McapEncoder::add_chunk`].
pub struct ChunkBuilder<'a> {
    records: Vec<Record>,
    next_sequence: &'a mut u32,
}

impl ChunkBuilder<'_> {
    pub fn add_channel(
        &mut self,
        id: u32,
        topic: &str,
        schema_format: &str,
        schema_name: &str,
        schema: &[u8],
    ) -> &mut Self {
        self.add_record(Record::ChannelInfo(channel_info(
            id,
            topic,
            schema_format,
            schema_name,
            schema,
        )))
    }

    pub fn add_message(&mut self, channel_id: u32, timestamp: u64, data: &[u8]) -> &mut Self {
        let record = message(self.next_sequence, channel_id, timestamp, data);
        self.add_record(record)
    }

    /// Add any record, including a nested Chunk or a Footer.
    pub fn add_record(&mut self, record: Record) -> &mut Self {
        self.records.push(record);
        self
    }
}

fn channel_info(
    id: u32,
    topic: &str,
    schema_format: &str,
    schema_name: &str,
    schema: &[u8],
) -> ChannelInfo {
    ChannelInfo {
        id,
        topic: topic.to_string(),
        schema_format: schema_format.to_string(),
        schema_name: schema_name.to_string(),
        schema: schema.to_vec(),
    }
}

fn message(next_sequence: &mut u32, channel_id: u32, timestamp: u64, data: &[u8]) -> Record {
    let sequence = *next_sequence;
    *next_sequence = next_sequence.wrapping_add(1);
    Record::Message(MessageRecord {
        channel_id,
        sequence,
        timestamp,
        data: data.to_vec(),
    })
}

fn encode_chunk(chunk: &PendingChunk) -> Result<ChunkRecord, EncodeError> {
    let mut plain = Vec::new();
    for record in &chunk.records {
        record.write_to(&mut plain)?;
    }

    Ok(ChunkRecord {
        decompressed_size: chunk.declared_size.unwrap_or(plain.len() as u64),
        decompressed_crc: 0,
        compression: chunk
            .tag
            .clone()
            .unwrap_or_else(|| chunk.compression.tag().to_string()),
        data: compression::compress(chunk.compression, &plain)?,
    })
}

#[cfg(test)]
mod tests {
    use mcap_wire::{MAGIC_LEN, RecordReader};

    use super::*;

    /// Split an encoded stream into leading magic, records and trailing
    /// magic.
    fn parse(stream: &[u8]) -> (Magic, Vec<Record>, Magic) {
        let (head, _) = Magic::probe(stream).unwrap().unwrap();
        let body = &stream[MAGIC_LEN..stream.len() - MAGIC_LEN];
        let records = RecordReader::new()
            .records(body)
            .map(|r| r.unwrap().1)
            .collect();
        let (tail, _) = Magic::probe(&stream[stream.len() - MAGIC_LEN..])
            .unwrap()
            .unwrap();
        (head, records, tail)
    }

    #[test]
    fn default_stream_is_framed() {
        let stream = McapEncoder::new()
            .add_channel(1, "/foo", "ros1", "pkg/Foo", b"int32 a")
            .add_message(1, 5, &[1, 0, 0, 0])
            .encode()
            .unwrap();

        let (head, records, tail) = parse(&stream);
        assert_eq!(head, Magic::current());
        assert_eq!(tail, Magic::current());
        assert_eq!(records.len(), 3);
        assert!(matches!(records[2], Record::Footer(_)));
    }

    #[test]
    fn sequences_run_across_chunks() {
        let stream = McapEncoder::new()
            .add_message(1, 1, b"a")
            .add_chunk(Compression::None, |c| {
                c.add_message(1, 2, b"b");
            })
            .add_message(1, 3, b"c")
            .encode()
            .unwrap();

        let (_, records, _) = parse(&stream);
        let Record::Chunk(chunk) = &records[1] else {
            panic!("expected chunk, got {:?}", records[1]);
        };
        let inner = RecordReader::new().records(&chunk.data).next().unwrap().unwrap().1;
        assert!(matches!(inner, Record::Message(MessageRecord { sequence: 1, .. })));
        assert!(matches!(&records[2], Record::Message(MessageRecord { sequence: 2, .. })));
    }

    #[test]
    fn chunk_declares_true_size_by_default() {
        let stream = McapEncoder::new()
            .add_chunk(Compression::Lz4, |c| {
                c.add_message(1, 1, &[0; 64]);
            })
            .encode()
            .unwrap();

        let (_, records, _) = parse(&stream);
        let Record::Chunk(chunk) = &records[0] else {
            panic!("expected chunk");
        };
        assert_eq!(chunk.compression, "lz4");
        let plain = lz4_flex::block::decompress(&chunk.data, chunk.decompressed_size as usize)
            .unwrap();
        assert_eq!(plain.len() as u64, chunk.decompressed_size);
    }

    #[test]
    fn declared_size_and_tag_overrides() {
        let stream = McapEncoder::new()
            .add_chunk(Compression::None, |c| {
                c.add_message(1, 1, b"x");
            })
            .with_declared_size(999)
            .with_compression_tag("brotli")
            .encode()
            .unwrap();

        let (_, records, _) = parse(&stream);
        let Record::Chunk(chunk) = &records[0] else {
            panic!("expected chunk");
        };
        assert_eq!(chunk.decompressed_size, 999);
        assert_eq!(chunk.compression, "brotli");
    }

    #[test]
    fn modifier_without_chunk_is_reported() {
        let err = McapEncoder::new()
            .add_message(1, 1, b"x")
            .with_declared_size(1)
            .encode()
            .unwrap_err();
        assert!(matches!(
            err,
            EncodeError::NoChunkToModify {
                modifier: "with_declared_size"
            }
        ));
    }

    #[test]
    fn framing_can_be_dropped() {
        let stream = McapEncoder::new()
            .without_footer()
            .without_trailing_magic()
            .encode()
            .unwrap();
        assert_eq!(stream.len(), MAGIC_LEN);

        let stream = McapEncoder::new().format_version(2).encode().unwrap();
        assert_eq!(stream[5], b'2');
    }

    #[test]
    fn raw_bytes_are_spliced_in_place() {
        let stream = McapEncoder::new()
            .add_raw(&[0xAA, 0xBB])
            .without_footer()
            .without_trailing_magic()
            .encode()
            .unwrap();
        assert_eq!(&stream[MAGIC_LEN..], &[0xAA, 0xBB]);
    }
}
