//! Shared stream fixtures for integration tests and benchmarks.

use mcap_encoder::McapEncoder;
use mcap_stream::{DecodedMessage, MemoryTransport, ProtocolError, RequestWindow, Subscriptions, retrieve};

pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// ROS 1 `std_msgs/String`.
pub const STRING_SCHEMA: &[u8] = b"string data";

/// A ROS 1 schema with a nested header and a dynamic array.
pub const SCAN_SCHEMA: &[u8] = b"Header header
float32[] ranges
================================================================================
MSG: std_msgs/Header
uint32 seq
time stamp
string frame_id
";

/// Length-prefixed ROS 1 string payload.
#[must_use]
pub fn string_payload(s: &str) -> Vec<u8> {
    let mut out = u32::try_from(s.len()).unwrap_or(u32::MAX).to_le_bytes().to_vec();
    out.extend_from_slice(s.as_bytes());
    out
}

/// ROS 1 payload for [`SCAN_SCHEMA`].
#[must_use]
pub fn scan_payload(seq: u32, stamp_sec: u32, ranges: &[f32]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&seq.to_le_bytes());
    out.extend_from_slice(&stamp_sec.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&string_payload("laser"));
    out.extend_from_slice(&u32::try_from(ranges.len()).unwrap_or(u32::MAX).to_le_bytes());
    for r in ranges {
        out.extend_from_slice(&r.to_le_bytes());
    }
    out
}

/// One `/foo` channel with string messages at 1.0 s, 2.0 s and 3.0 s.
#[must_use]
pub fn three_second_stream() -> McapEncoder {
    let mut encoder = McapEncoder::new();
    encoder.add_channel(1, "/foo", "ros1", "std_msgs/String", STRING_SCHEMA);
    for sec in 1..=3u64 {
        encoder.add_message(1, sec * NANOS_PER_SEC, &string_payload(&format!("t{sec}")));
    }
    encoder
}

/// A larger stream for throughput measurements: `chunks` chunks of
/// `per_chunk` scan messages each, spread over two topics.
#[must_use]
pub fn scan_stream(chunks: u32, per_chunk: u32, compression: mcap_wire::Compression) -> Vec<u8> {
    let ranges: Vec<f32> = (0..64u16).map(|i| f32::from(i) * 0.25).collect();
    let mut encoder = McapEncoder::new();
    encoder
        .add_channel(1, "/scan/front", "ros1", "sensor_msgs/LaserScan", SCAN_SCHEMA)
        .add_channel(2, "/scan/rear", "ros1", "sensor_msgs/LaserScan", SCAN_SCHEMA);
    for chunk in 0..chunks {
        encoder.add_chunk(compression, |c| {
            for i in 0..per_chunk {
                let seq = chunk * per_chunk + i;
                c.add_message(1 + seq % 2, u64::from(seq) * 10_000_000, &scan_payload(seq, seq / 100, &ranges));
            }
        });
    }
    encoder.encode().expect("scan fixture encodes")
}

/// Retrieve from `stream` delivered in `chunk_size` increments.
///
/// # Errors
///
/// Any [`ProtocolError`] from the retrieval.
pub async fn retrieve_split(
    stream: &[u8],
    chunk_size: usize,
    window: RequestWindow,
    topics: Subscriptions,
) -> Result<Vec<DecodedMessage>, ProtocolError> {
    let transport = MemoryTransport::split(stream.to_vec(), chunk_size);
    retrieve(transport, window.start, window.end, topics).await
}

/// Blocking wrapper around [`retrieve_split`] for benchmarks.
///
/// # Errors
///
/// Any [`ProtocolError`] from the retrieval.
///
/// # Panics
///
/// If a tokio runtime cannot be built.
pub fn retrieve_blocking(
    stream: &[u8],
    chunk_size: usize,
    window: RequestWindow,
    topics: Subscriptions,
) -> Result<Vec<DecodedMessage>, ProtocolError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("tokio runtime");
    runtime.block_on(retrieve_split(stream, chunk_size, window, topics))
}
