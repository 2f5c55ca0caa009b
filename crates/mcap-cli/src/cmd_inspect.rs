/// Implementation of `mcap inspect`.
///
/// Walks the top level of a file with the tokenizer alone: no channel
/// registration, no decompression, no payload decoding. Useful for
/// looking at streams that `validate` rejects.
///
/// # Output format
///
/// ```text
/// 0x00000000  Magic        v1
/// 0x00000008  ChannelInfo  (56 bytes)  id=1 topic="/imu" format=ros1 schema=sensor/Imu
/// 0x00000040  Message      (33 bytes)  channel=1 seq=0 time=1.500000000
/// 0x00000061  Chunk        (107 bytes)  compression=lz4 compressed=79 decompressed=84
/// 0x000000cc  Footer       (21 bytes)  index_offset=0 index_crc=0
/// 0x000000e1  Magic        v1
/// ---
/// 4 records, 233 bytes
/// ```
use std::fs;

use anyhow::{Context, Result, anyhow};
use mcap_stream::Time;
use mcap_wire::{Magic, Record, RecordReader};

use crate::InspectArgs;

/// Run the `mcap inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a magic marker is
/// invalid, or a record cannot be tokenized.
pub fn run(args: &InspectArgs) -> Result<()> {
    let bytes =
        fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    for line in listing(&bytes)? {
        println!("{line}");
    }
    Ok(())
}

/// Produce the inspect listing for a complete file.
///
/// Stops after the trailing magic. A file that ends early is listed as
/// far as it goes, followed by a `truncated` marker.
fn listing(bytes: &[u8]) -> Result<Vec<String>> {
    let reader = RecordReader::new();
    let mut lines = Vec::new();
    let mut pos = 0;
    let mut records = 0usize;

    let Some(len) = magic_line(bytes, pos, &mut lines)? else {
        lines.push("--- truncated in leading magic".to_string());
        return Ok(lines);
    };
    pos += len;

    loop {
        let Some((record, len)) = reader
            .read_record(&bytes[pos..])
            .with_context(|| format!("bad record at offset {pos:#x}"))?
        else {
            lines.push(format!("--- truncated at offset {pos:#x}"));
            return Ok(lines);
        };
        lines.push(format!(
            "{pos:#010x}  {:<11}  ({len} bytes)  {}",
            record.kind().name(),
            detail(&record)
        ));
        records += 1;
        pos += len;
        if matches!(record, Record::Footer(_)) {
            break;
        }
    }

    let Some(len) = magic_line(bytes, pos, &mut lines)? else {
        lines.push("--- truncated in trailing magic".to_string());
        return Ok(lines);
    };
    pos += len;

    lines.push("---".to_string());
    lines.push(format!("{records} records, {pos} bytes"));
    if pos < bytes.len() {
        lines.push(format!("{} bytes after the trailing magic", bytes.len() - pos));
    }
    Ok(lines)
}

fn magic_line(bytes: &[u8], pos: usize, lines: &mut Vec<String>) -> Result<Option<usize>> {
    match Magic::probe(&bytes[pos..]) {
        Ok(Some((magic, len))) => {
            lines.push(format!("{pos:#010x}  {:<11}  v{}", "Magic", magic.format_version));
            Ok(Some(len))
        }
        Ok(None) => Ok(None),
        Err(e) => Err(anyhow!(e).context(format!("bad magic at offset {pos:#x}"))),
    }
}

// ── Record formatting helpers ─────────────────────────────────────────────────

/// Key fields of a record, formatted to follow the kind and size.
fn detail(record: &Record) -> String {
    match record {
        Record::ChannelInfo(info) => format!(
            "id={} topic={:?} format={} schema={}",
            info.id, info.topic, info.schema_format, info.schema_name
        ),
        Record::Message(m) => format!(
            "channel={} seq={} time={}",
            m.channel_id,
            m.sequence,
            Time::from_nanos(m.timestamp)
        ),
        Record::Chunk(c) => format!(
            "compression={} compressed={} decompressed={}",
            if c.compression.is_empty() { "none" } else { c.compression.as_str() },
            c.data.len(),
            c.decompressed_size
        ),
        Record::IndexData(body) | Record::ChunkInfo(body) => format!("opaque={}", body.len()),
        Record::Footer(f) => format!("index_offset={} index_crc={}", f.index_offset, f.index_crc),
    }
}
