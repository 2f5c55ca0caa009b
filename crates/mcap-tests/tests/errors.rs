//! Rejection tests: every protocol violation aborts the retrieval with a
//! specific error kind and no partial results.
//!
//! Each stream is delivered in small increments so that the failure is
//! detected across increment boundaries, not just in a single buffer.

use mcap_encoder::McapEncoder;
use mcap_stream::{
    ChannelTransport, ProtocolError, ProtocolState, RequestWindow, Subscriptions, TransportError, retrieve,
};
use mcap_tests::{STRING_SCHEMA, retrieve_split, string_payload, three_second_stream};
use mcap_wire::{ChannelInfo, ChunkRecord, Compression, Footer, Record, RecordKind};

async fn run(stream: &[u8]) -> ProtocolError {
    match retrieve_split(stream, 5, RequestWindow::all(), Subscriptions::All).await {
        Ok(messages) => panic!("expected an error, got {} messages", messages.len()),
        Err(e) => e,
    }
}

fn info(schema: &[u8]) -> ChannelInfo {
    ChannelInfo {
        id: 1,
        topic: "/foo".to_string(),
        schema_format: "ros1".to_string(),
        schema_name: "std_msgs/String".to_string(),
        schema: schema.to_vec(),
    }
}

// ── Channel registry ──────────────────────────────────────────────────────────

#[tokio::test]
async fn repeated_identical_channel_info_is_idempotent() {
    let stream = McapEncoder::new()
        .add_channel_info(info(STRING_SCHEMA))
        .add_channel_info(info(STRING_SCHEMA))
        .add_message(1, 0, &string_payload("x"))
        .encode()
        .unwrap();
    let messages = retrieve_split(&stream, 5, RequestWindow::all(), Subscriptions::All).await.unwrap();
    assert_eq!(messages.len(), 1);
}

#[tokio::test]
async fn conflicting_channel_info_fails_before_messages() {
    let stream = McapEncoder::new()
        .add_channel_info(info(STRING_SCHEMA))
        .add_channel_info(info(b"string text"))
        .add_message(1, 0, &string_payload("x"))
        .encode()
        .unwrap();
    assert!(matches!(
        run(&stream).await,
        ProtocolError::ConflictingChannelInfo { channel_id: 1 }
    ));
}

#[tokio::test]
async fn message_on_unknown_channel() {
    let stream = McapEncoder::new()
        .add_channel(1, "/foo", "ros1", "std_msgs/String", STRING_SCHEMA)
        .add_message(2, 0, &string_payload("x"))
        .encode()
        .unwrap();
    assert!(matches!(run(&stream).await, ProtocolError::UnknownChannel { channel_id: 2 }));
}

#[tokio::test]
async fn unknown_schema_format() {
    let stream = McapEncoder::new()
        .add_channel(1, "/foo", "protobuf", "pkg.Msg", b"\x0a\x00")
        .encode()
        .unwrap();
    assert!(matches!(
        run(&stream).await,
        ProtocolError::UnsupportedSchemaFormat { channel_id: 1, format } if format == "protobuf"
    ));
}

#[tokio::test]
async fn unparseable_schema_text() {
    let stream = McapEncoder::new()
        .add_channel(1, "/foo", "ros1", "pkg/Bad", b"int32")
        .encode()
        .unwrap();
    assert!(matches!(run(&stream).await, ProtocolError::InvalidSchema { channel_id: 1, .. }));
}

#[tokio::test]
async fn payload_shorter_than_schema() {
    let stream = McapEncoder::new()
        .add_channel(1, "/foo", "ros1", "pkg/Pair", b"uint32 a\nuint32 b")
        .add_message(1, 0, &[1, 0, 0, 0])
        .encode()
        .unwrap();
    assert!(matches!(run(&stream).await, ProtocolError::DecodeFailed { channel_id: 1, .. }));
}

// ── Chunks ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn declared_size_mismatch() {
    for compression in [Compression::Lz4, Compression::Zstd] {
        let stream = McapEncoder::new()
            .add_chunk(compression, |c| {
                c.add_channel(1, "/foo", "ros1", "std_msgs/String", STRING_SCHEMA);
            })
            .with_declared_size(3)
            .encode()
            .unwrap();
        assert!(
            matches!(run(&stream).await, ProtocolError::DecompressionFailed { .. }),
            "{compression:?}"
        );
    }
}

#[tokio::test]
async fn unknown_compression_tag() {
    let stream = McapEncoder::new()
        .add_chunk(Compression::None, |_| {})
        .with_compression_tag("brotli")
        .encode()
        .unwrap();
    assert!(matches!(
        run(&stream).await,
        ProtocolError::DecompressionFailed { compression, .. } if compression == "brotli"
    ));
}

#[tokio::test]
async fn nested_chunk() {
    let inner = ChunkRecord {
        decompressed_size: 0,
        decompressed_crc: 0,
        compression: "none".to_string(),
        data: Vec::new(),
    };
    let stream = McapEncoder::new()
        .add_chunk(Compression::Lz4, |c| {
            c.add_record(Record::Chunk(inner));
        })
        .encode()
        .unwrap();
    assert!(matches!(run(&stream).await, ProtocolError::NestedChunkNotSupported));
}

#[tokio::test]
async fn index_data_inside_chunk() {
    let stream = McapEncoder::new()
        .add_chunk(Compression::Zstd, |c| {
            c.add_record(Record::IndexData(Vec::new()));
        })
        .encode()
        .unwrap();
    assert!(matches!(
        run(&stream).await,
        ProtocolError::UnsupportedRecordKind {
            kind: RecordKind::IndexData
        }
    ));
}

#[tokio::test]
async fn chunk_info_records_are_unsupported() {
    let stream = McapEncoder::new()
        .add_record(Record::ChunkInfo(vec![0; 8]))
        .encode()
        .unwrap();
    assert!(matches!(
        run(&stream).await,
        ProtocolError::UnsupportedRecordKind {
            kind: RecordKind::ChunkInfo
        }
    ));
}

// ── Framing ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_trailing_magic_never_succeeds() {
    let stream = three_second_stream().without_trailing_magic().encode().unwrap();
    assert!(matches!(
        run(&stream).await,
        ProtocolError::TruncatedStream {
            state: ProtocolState::AwaitingFooterMagic,
            ..
        }
    ));
}

#[tokio::test]
async fn record_in_place_of_trailing_magic() {
    let mut stream = three_second_stream().without_trailing_magic().encode().unwrap();
    Record::Footer(Footer::default()).write_to(&mut stream).unwrap();
    assert!(matches!(run(&stream).await, ProtocolError::UnsupportedVersion { found: None }));
}

#[tokio::test]
async fn missing_footer_is_truncated() {
    let stream = three_second_stream()
        .without_footer()
        .without_trailing_magic()
        .encode()
        .unwrap();
    assert!(matches!(
        run(&stream).await,
        ProtocolError::TruncatedStream {
            state: ProtocolState::ReadingBody,
            buffered: 0
        }
    ));
}

#[tokio::test]
async fn stream_cut_mid_record() {
    let mut stream = three_second_stream().encode().unwrap();
    stream.truncate(40);
    assert!(matches!(
        run(&stream).await,
        ProtocolError::TruncatedStream {
            state: ProtocolState::ReadingBody,
            buffered
        } if buffered > 0
    ));
}

#[tokio::test]
async fn wrong_leading_version() {
    let stream = three_second_stream().format_version(0).encode().unwrap();
    assert!(matches!(run(&stream).await, ProtocolError::UnsupportedVersion { found: Some(0) }));
}

#[tokio::test]
async fn missing_leading_magic() {
    let stream = three_second_stream().without_leading_magic().encode().unwrap();
    assert!(matches!(run(&stream).await, ProtocolError::UnsupportedVersion { found: None }));
}

#[tokio::test]
async fn not_a_container() {
    assert!(matches!(
        run(b"{\"topic\":\"/foo\"}").await,
        ProtocolError::UnsupportedVersion { found: None }
    ));
}

#[tokio::test]
async fn trailing_data_after_magic() {
    let mut stream = three_second_stream().encode().unwrap();
    stream.extend_from_slice(&[0u8; 11]);
    assert!(matches!(
        run(&stream).await,
        ProtocolError::TrailingDataAfterFooter { extra } if extra > 0
    ));
}

#[tokio::test]
async fn unknown_opcode_is_malformed() {
    let stream = McapEncoder::new()
        .add_raw(&[0x7F, 0, 0, 0, 0, 0, 0, 0, 0])
        .encode()
        .unwrap();
    assert!(matches!(run(&stream).await, ProtocolError::Malformed(_)));
}

// ── Transport ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn transport_failure_is_not_a_protocol_error() {
    let stream = three_second_stream().encode().unwrap();
    let (tx, transport) = ChannelTransport::channel(4);
    let producer = tokio::spawn(async move {
        tx.send(Ok(stream[..30].to_vec().into())).await.unwrap();
        tx.send(Err(TransportError::Io(std::io::Error::other("socket closed"))))
            .await
            .unwrap();
    });

    let err = retrieve(transport, mcap_stream::Time::MIN, mcap_stream::Time::MAX, Subscriptions::All)
        .await
        .unwrap_err();
    producer.await.unwrap();
    assert!(matches!(err, ProtocolError::Transport(TransportError::Io(_))));
}
