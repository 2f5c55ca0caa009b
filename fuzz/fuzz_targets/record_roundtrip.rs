#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mcap_wire::{ChannelInfo, ChunkRecord, Footer, MessageRecord, Record, RecordReader};

// Fuzz target: Record write->read roundtrip.
//
// Any record the writer accepts must tokenize back to an equal record,
// consuming exactly the bytes written.
#[derive(Arbitrary, Debug)]
enum Input {
    ChannelInfo {
        id: u32,
        topic: String,
        schema_format: String,
        schema_name: String,
        schema: Vec<u8>,
    },
    Message {
        channel_id: u32,
        sequence: u32,
        timestamp: u64,
        data: Vec<u8>,
    },
    Chunk {
        decompressed_size: u64,
        decompressed_crc: u32,
        compression: String,
        data: Vec<u8>,
    },
    IndexData(Vec<u8>),
    ChunkInfo(Vec<u8>),
    Footer {
        index_offset: u64,
        index_crc: u32,
    },
}

impl From<Input> for Record {
    fn from(input: Input) -> Self {
        match input {
            Input::ChannelInfo { id, topic, schema_format, schema_name, schema } => {
                Record::ChannelInfo(ChannelInfo { id, topic, schema_format, schema_name, schema })
            }
            Input::Message { channel_id, sequence, timestamp, data } => {
                Record::Message(MessageRecord { channel_id, sequence, timestamp, data })
            }
            Input::Chunk { decompressed_size, decompressed_crc, compression, data } => {
                Record::Chunk(ChunkRecord { decompressed_size, decompressed_crc, compression, data })
            }
            Input::IndexData(body) => Record::IndexData(body),
            Input::ChunkInfo(body) => Record::ChunkInfo(body),
            Input::Footer { index_offset, index_crc } => Record::Footer(Footer { index_offset, index_crc }),
        }
    }
}

fuzz_target!(|input: Input| {
    let record = Record::from(input);
    let mut buf = Vec::new();
    let Ok(written) = record.write_to(&mut buf) else {
        return;
    };

    let (parsed, consumed) = RecordReader::new()
        .read_record(&buf)
        .unwrap()
        .expect("complete record");
    assert_eq!(consumed, written);
    assert_eq!(parsed, record);
});
