use std::fmt;

use mcap_wire::{Magic, MessageRecord, Record, RecordReader};

use crate::collector::{Collector, DecodedMessage, Subscriptions};
use crate::config::StreamConfig;
use crate::error::ProtocolError;
use crate::registry::ChannelRegistry;
use crate::time::{RequestWindow, Time};
use crate::unpack::ChunkUnpacker;

/// Where a stream is in its framing.
///
/// ```text
///   AwaitingHeader ──magic v1──▶ ReadingBody ──Footer──▶ AwaitingFooterMagic ──magic v1──▶ Done
///         │                          │                           │
///         └──────────────────────────┴─────── any error ─────────┴──────────▶ Failed
/// ```
///
/// `Failed` absorbs: once entered, every further call reports
/// [`ProtocolError::Poisoned`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtocolState {
    AwaitingHeader,
    ReadingBody,
    AwaitingFooterMagic,
    Done,
    Failed,
}

impl ProtocolState {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::AwaitingHeader => "awaiting header",
            Self::ReadingBody => "reading body",
            Self::AwaitingFooterMagic => "awaiting footer magic",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ProtocolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read-only inputs to record routing.
#[derive(Clone, Copy, Debug)]
pub struct RouteContext<'a> {
    pub reader: &'a RecordReader,
    pub unpacker: &'a ChunkUnpacker,
    pub subscriptions: &'a Subscriptions,
}

/// Route every record in a fully decompressed chunk body.
///
/// Chunk contents follow the top-level record grammar minus framing:
/// a Footer or another Chunk inside is an error. The body must end on a
/// record boundary.
///
/// # Errors
///
/// Any [`ProtocolError`] raised by a contained record, or
/// [`ProtocolError::Malformed`] if the body ends mid-record.
pub fn dispatch(
    bytes: &[u8],
    ctx: RouteContext<'_>,
    registry: &mut ChannelRegistry,
    collector: &mut Collector,
) -> Result<(), ProtocolError> {
    for item in ctx.reader.records(bytes) {
        let (_, record) = item?;
        route(record, 1, ctx, registry, collector)?;
    }
    Ok(())
}

/// Send one body record to the registry, unpacker or collector.
/// `depth` is 0 for top-level records and 1 inside a chunk.
fn route(
    record: Record,
    depth: usize,
    ctx: RouteContext<'_>,
    registry: &mut ChannelRegistry,
    collector: &mut Collector,
) -> Result<(), ProtocolError> {
    match record {
        Record::ChannelInfo(info) => registry.register(info),
        Record::Message(message) => accept_message(&message, ctx, registry, collector),
        Record::Chunk(_) if depth > 0 => Err(ProtocolError::NestedChunkNotSupported),
        Record::Chunk(chunk) => {
            let bytes = ctx.unpacker.unpack(chunk)?;
            dispatch(&bytes, ctx, registry, collector)
        }
        Record::IndexData(_) | Record::ChunkInfo(_) => Err(ProtocolError::UnsupportedRecordKind {
            kind: record.kind(),
        }),
        // Top-level footers are consumed by the state machine.
        Record::Footer(_) => Err(ProtocolError::UnexpectedFooter),
    }
}

fn accept_message(
    message: &MessageRecord,
    ctx: RouteContext<'_>,
    registry: &ChannelRegistry,
    collector: &mut Collector,
) -> Result<(), ProtocolError> {
    let entry = registry
        .lookup(message.channel_id)
        .ok_or(ProtocolError::UnknownChannel {
            channel_id: message.channel_id,
        })?;

    let receive_time = Time::from_nanos(message.timestamp);
    if !collector.admits(receive_time) || !ctx.subscriptions.contains(&entry.info.topic) {
        return Ok(());
    }

    let value = entry
        .decoder
        .decode(&message.data)
        .map_err(|source| ProtocolError::DecodeFailed {
            channel_id: message.channel_id,
            topic: entry.info.topic.clone(),
            source,
        })?;

    collector.collect(DecodedMessage {
        topic: entry.info.topic.clone(),
        receive_time,
        message: value,
    });
    Ok(())
}

/// The record-level state machine for one retrieval.
///
/// [`advance`](Self::advance) is fed the driver's unread bytes and
/// reports how many it consumed; whatever is left is an incomplete
/// magic or record that needs more input. The dispatcher itself holds
/// no byte buffer.
#[derive(Debug)]
pub struct RecordDispatcher {
    state: ProtocolState,
    reader: RecordReader,
    unpacker: ChunkUnpacker,
    subscriptions: Subscriptions,
    registry: ChannelRegistry,
    collector: Collector,
    /// Total bytes consumed, for log context.
    offset: u64,
}

impl RecordDispatcher {
    #[must_use]
    pub fn new(config: &StreamConfig, window: RequestWindow, subscriptions: Subscriptions) -> Self {
        Self {
            state: ProtocolState::AwaitingHeader,
            reader: RecordReader::with_max_record_len(config.max_record_len),
            unpacker: ChunkUnpacker::new(config.max_chunk_decompressed_size),
            subscriptions,
            registry: ChannelRegistry::new(),
            collector: Collector::new(window),
            offset: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> ProtocolState {
        self.state
    }

    #[must_use]
    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    #[must_use]
    pub fn collected(&self) -> usize {
        self.collector.len()
    }

    /// Consume as many complete units (magic markers, records) from the
    /// front of `buf` as are available.
    ///
    /// # Returns
    ///
    /// The number of bytes consumed. The caller keeps the rest and
    /// passes it again, extended, on the next call.
    ///
    /// # Errors
    ///
    /// Any [`ProtocolError`]. The dispatcher moves to
    /// [`ProtocolState::Failed`] and every later call returns
    /// [`ProtocolError::Poisoned`].
    pub fn advance(&mut self, buf: &[u8]) -> Result<usize, ProtocolError> {
        if self.state == ProtocolState::Failed {
            return Err(ProtocolError::Poisoned);
        }

        let mut consumed = 0;
        let result = self.advance_inner(buf, &mut consumed);
        self.offset += consumed as u64;

        if let Err(error) = &result {
            tracing::warn!(
                state = %self.state,
                offset = self.offset,
                error = %error,
                "stream rejected"
            );
            self.state = ProtocolState::Failed;
        }
        result.map(|()| consumed)
    }

    fn advance_inner(&mut self, buf: &[u8], consumed: &mut usize) -> Result<(), ProtocolError> {
        loop {
            let rest = &buf[*consumed..];
            match self.state {
                ProtocolState::AwaitingHeader | ProtocolState::AwaitingFooterMagic => {
                    let Some(len) = Self::expect_magic(rest)? else {
                        return Ok(());
                    };
                    *consumed += len;
                    let next = if self.state == ProtocolState::AwaitingHeader {
                        ProtocolState::ReadingBody
                    } else {
                        ProtocolState::Done
                    };
                    self.transition(next);
                }
                ProtocolState::ReadingBody => {
                    let Some((record, len)) = self.reader.read_record(rest)? else {
                        return Ok(());
                    };
                    *consumed += len;
                    if let Record::Footer(_) = record {
                        self.transition(ProtocolState::AwaitingFooterMagic);
                        continue;
                    }
                    let ctx = RouteContext {
                        reader: &self.reader,
                        unpacker: &self.unpacker,
                        subscriptions: &self.subscriptions,
                    };
                    route(record, 0, ctx, &mut self.registry, &mut self.collector)?;
                }
                ProtocolState::Done => {
                    if rest.is_empty() {
                        return Ok(());
                    }
                    return Err(ProtocolError::TrailingDataAfterFooter { extra: rest.len() });
                }
                ProtocolState::Failed => return Err(ProtocolError::Poisoned),
            }
        }
    }

    /// Probe for a supported magic marker. `None` means "need more bytes".
    fn expect_magic(buf: &[u8]) -> Result<Option<usize>, ProtocolError> {
        match Magic::probe(buf) {
            Ok(None) => Ok(None),
            Ok(Some((magic, len))) if magic.is_supported() => Ok(Some(len)),
            Ok(Some((magic, _))) => Err(ProtocolError::UnsupportedVersion {
                found: Some(magic.format_version),
            }),
            Err(_) => Err(ProtocolError::UnsupportedVersion { found: None }),
        }
    }

    fn transition(&mut self, next: ProtocolState) {
        tracing::debug!(from = %self.state, to = %next, offset = self.offset, "state transition");
        self.state = next;
    }

    /// End of input. Yields the collected messages if the stream
    /// reached [`ProtocolState::Done`].
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::TruncatedStream`] if the stream stopped short,
    ///   with `unconsumed` reported as the buffered tail.
    /// - [`ProtocolError::Poisoned`] if the dispatcher already failed.
    pub fn finish(self, unconsumed: usize) -> Result<Vec<DecodedMessage>, ProtocolError> {
        match self.state {
            ProtocolState::Done => Ok(self.collector.into_messages()),
            ProtocolState::Failed => Err(ProtocolError::Poisoned),
            state => {
                tracing::warn!(state = %state, buffered = unconsumed, "stream truncated");
                Err(ProtocolError::TruncatedStream {
                    state,
                    buffered: unconsumed,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mcap_encoder::McapEncoder;
    use mcap_wire::{Compression, Footer};

    use super::*;

    const SCHEMA: &[u8] = b"int32 value";

    fn dispatcher() -> RecordDispatcher {
        RecordDispatcher::new(&StreamConfig::default(), RequestWindow::all(), Subscriptions::All)
    }

    fn payload(v: i32) -> [u8; 4] {
        v.to_le_bytes()
    }

    /// Feed the whole stream at once and finish.
    fn run(stream: &[u8]) -> Result<Vec<DecodedMessage>, ProtocolError> {
        let mut d = dispatcher();
        let consumed = d.advance(stream)?;
        d.finish(stream.len() - consumed)
    }

    fn simple_stream() -> Vec<u8> {
        McapEncoder::new()
            .add_channel(1, "/foo", "ros1", "pkg/Value", SCHEMA)
            .add_message(1, 1_000_000_000, &payload(1))
            .add_message(1, 2_000_000_000, &payload(2))
            .encode()
            .unwrap()
    }

    #[test]
    fn whole_stream_in_one_call() {
        let messages = run(&simple_stream()).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].message, serde_json::json!({ "value": 2 }));
    }

    #[test]
    fn byte_at_a_time() {
        let stream = simple_stream();
        let mut d = dispatcher();
        let mut pending = Vec::new();
        for &byte in &stream {
            pending.push(byte);
            let n = d.advance(&pending).unwrap();
            pending.drain(..n);
        }
        assert_eq!(d.state(), ProtocolState::Done);
        assert_eq!(d.registry().len(), 1);
        assert_eq!(d.collected(), 2);
        assert_eq!(d.finish(pending.len()).unwrap().len(), 2);
    }

    #[test]
    fn partial_magic_waits() {
        let mut d = dispatcher();
        assert_eq!(d.advance(&[0x89, b'M', b'C']).unwrap(), 0);
        assert_eq!(d.state(), ProtocolState::AwaitingHeader);
    }

    #[test]
    fn bad_leading_magic() {
        let mut d = dispatcher();
        let err = d.advance(b"PK\x03\x04").unwrap_err();
        assert!(matches!(err, ProtocolError::UnsupportedVersion { found: None }));
        assert_eq!(d.state(), ProtocolState::Failed);
        assert!(matches!(d.advance(&[]), Err(ProtocolError::Poisoned)));
    }

    #[test]
    fn unsupported_leading_version() {
        let stream = McapEncoder::new().format_version(2).encode().unwrap();
        let err = run(&stream).unwrap_err();
        assert!(matches!(err, ProtocolError::UnsupportedVersion { found: Some(2) }));
    }

    #[test]
    fn record_where_trailing_magic_belongs() {
        let mut stream = McapEncoder::new().without_trailing_magic().encode().unwrap();
        Record::Footer(Footer::default()).write_to(&mut stream).unwrap();
        let err = run(&stream).unwrap_err();
        assert!(matches!(err, ProtocolError::UnsupportedVersion { found: None }));
    }

    #[test]
    fn trailing_magic_with_wrong_version() {
        let stream = McapEncoder::new().trailing_version(3).encode().unwrap();
        let err = run(&stream).unwrap_err();
        assert!(matches!(err, ProtocolError::UnsupportedVersion { found: Some(3) }));
    }

    #[test]
    fn missing_trailing_magic_is_truncated() {
        let stream = McapEncoder::new().without_trailing_magic().encode().unwrap();
        let err = run(&stream).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::TruncatedStream {
                state: ProtocolState::AwaitingFooterMagic,
                buffered: 0
            }
        ));
    }

    #[test]
    fn data_after_trailing_magic() {
        let mut stream = simple_stream();
        stream.extend_from_slice(b"xx");
        let err = run(&stream).unwrap_err();
        assert!(matches!(err, ProtocolError::TrailingDataAfterFooter { extra: 2 }));
    }

    #[test]
    fn message_before_channel_info() {
        let stream = McapEncoder::new().add_message(7, 0, &payload(0)).encode().unwrap();
        let err = run(&stream).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownChannel { channel_id: 7 }));
    }

    #[test]
    fn unsubscribed_message_still_needs_channel() {
        let stream = McapEncoder::new().add_message(7, 0, &payload(0)).encode().unwrap();
        let mut d = RecordDispatcher::new(
            &StreamConfig::default(),
            RequestWindow::all(),
            Subscriptions::topics(["/other"]),
        );
        let err = d.advance(&stream).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownChannel { channel_id: 7 }));
    }

    #[test]
    fn out_of_window_payload_is_not_decoded() {
        // The payload is too short for the schema, but never decoded.
        let stream = McapEncoder::new()
            .add_channel(1, "/foo", "ros1", "pkg/Value", SCHEMA)
            .add_message(1, 10_000_000_000, &[0xFF])
            .encode()
            .unwrap();
        let window = RequestWindow::new(Time::MIN, Time { sec: 1, nsec: 0 });
        let mut d = RecordDispatcher::new(&StreamConfig::default(), window, Subscriptions::All);
        let consumed = d.advance(&stream).unwrap();
        assert!(d.finish(stream.len() - consumed).unwrap().is_empty());
    }

    #[test]
    fn in_window_bad_payload_fails() {
        let stream = McapEncoder::new()
            .add_channel(1, "/foo", "ros1", "pkg/Value", SCHEMA)
            .add_message(1, 0, &[0xFF])
            .encode()
            .unwrap();
        let err = run(&stream).unwrap_err();
        assert!(matches!(err, ProtocolError::DecodeFailed { channel_id: 1, .. }));
    }

    #[test]
    fn index_records_rejected() {
        let stream = McapEncoder::new()
            .add_record(Record::IndexData(vec![1, 2, 3]))
            .encode()
            .unwrap();
        let err = run(&stream).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::UnsupportedRecordKind {
                kind: mcap_wire::RecordKind::IndexData
            }
        ));
    }

    #[test]
    fn chunked_messages_are_routed() {
        let stream = McapEncoder::new()
            .add_chunk(Compression::Zstd, |c| {
                c.add_channel(1, "/foo", "ros1", "pkg/Value", SCHEMA)
                    .add_message(1, 5, &payload(9));
            })
            .encode()
            .unwrap();
        let messages = run(&stream).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].receive_time, Time { sec: 0, nsec: 5 });
    }

    #[test]
    fn nested_chunk_rejected() {
        let inner = mcap_wire::ChunkRecord {
            decompressed_size: 0,
            decompressed_crc: 0,
            compression: String::new(),
            data: Vec::new(),
        };
        let stream = McapEncoder::new()
            .add_chunk(Compression::None, |c| {
                c.add_record(Record::Chunk(inner));
            })
            .encode()
            .unwrap();
        let err = run(&stream).unwrap_err();
        assert!(matches!(err, ProtocolError::NestedChunkNotSupported));
    }

    #[test]
    fn footer_inside_chunk_rejected() {
        let stream = McapEncoder::new()
            .add_chunk(Compression::Lz4, |c| {
                c.add_record(Record::Footer(Footer::default()));
            })
            .encode()
            .unwrap();
        let err = run(&stream).unwrap_err();
        assert!(matches!(err, ProtocolError::UnexpectedFooter));
    }

    #[test]
    fn chunk_ending_mid_record_is_malformed() {
        let reader = RecordReader::new();
        let unpacker = ChunkUnpacker::new(1024);
        let subscriptions = Subscriptions::All;
        let ctx = RouteContext {
            reader: &reader,
            unpacker: &unpacker,
            subscriptions: &subscriptions,
        };
        let mut registry = ChannelRegistry::new();
        let mut collector = Collector::new(RequestWindow::all());
        let err = dispatch(&[0x02, 0x10, 0, 0], ctx, &mut registry, &mut collector).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn finish_before_done_is_truncated() {
        let stream = simple_stream();
        let cut = stream.len() - 12;
        let mut d = dispatcher();
        let consumed = d.advance(&stream[..cut]).unwrap();
        let err = d.finish(cut - consumed).unwrap_err();
        assert!(matches!(err, ProtocolError::TruncatedStream { .. }));
    }
}
