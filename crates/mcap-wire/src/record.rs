use crate::error::WireError;
use crate::field::{put_bytes, put_string, put_u32, put_u64, FieldReader};
use crate::kind::RecordKind;

/// Size of the record envelope before the body: opcode + u64 length.
pub const RECORD_PREFIX_LEN: usize = 9;

/// Binds a channel id to a topic and the schema its messages use.
///
/// Equality is structural over every field; the stream layer relies on
/// it to decide whether a repeated ChannelInfo is a harmless duplicate
/// or a conflicting redefinition.
///
/// ```text
///   id            u32
///   topic         string
///   schema_format string   ("ros1", "ros2", ...)
///   schema_name   string   root datatype, e.g. "std_msgs/String"
///   schema        bytes    message definition text
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: u32,
    pub topic: String,
    pub schema_format: String,
    pub schema_name: String,
    pub schema: Vec<u8>,
}

/// One timestamped payload on a channel.
///
/// `data` is everything after the fixed fields; it has no length prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageRecord {
    pub channel_id: u32,
    pub sequence: u32,
    /// Receive time in nanoseconds.
    pub timestamp: u64,
    pub data: Vec<u8>,
}

/// A block of records, compressed with the algorithm named by
/// `compression`.
///
/// `decompressed_crc` is carried but not verified by this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkRecord {
    pub decompressed_size: u64,
    pub decompressed_crc: u32,
    pub compression: String,
    pub data: Vec<u8>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Footer {
    pub index_offset: u64,
    pub index_crc: u32,
}

/// A single parsed container record.
///
/// IndexData and ChunkInfo are kept as opaque bodies: they are
/// recognised so they can be rejected by kind, never interpreted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Record {
    ChannelInfo(ChannelInfo),
    Message(MessageRecord),
    Chunk(ChunkRecord),
    IndexData(Vec<u8>),
    ChunkInfo(Vec<u8>),
    Footer(Footer),
}

impl Record {
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::ChannelInfo(_) => RecordKind::ChannelInfo,
            Self::Message(_) => RecordKind::Message,
            Self::Chunk(_) => RecordKind::Chunk,
            Self::IndexData(_) => RecordKind::IndexData,
            Self::ChunkInfo(_) => RecordKind::ChunkInfo,
            Self::Footer(_) => RecordKind::Footer,
        }
    }

    /// Parse a record body of the given kind.
    ///
    /// `body` must be exactly the bytes the envelope declared.
    ///
    /// # Errors
    ///
    /// - [`WireError::UnexpectedEof`] if a field runs past the body.
    /// - [`WireError::InvalidUtf8`] if a string field is not UTF-8.
    /// - [`WireError::TrailingBodyBytes`] if a fixed-layout body
    ///   (ChannelInfo, Footer) has bytes after its last field.
    pub fn decode_body(kind: RecordKind, body: &[u8]) -> Result<Self, WireError> {
        let mut r = FieldReader::new(body);

        let record = match kind {
            RecordKind::ChannelInfo => Self::ChannelInfo(ChannelInfo {
                id: r.read_u32()?,
                topic: r.read_string("topic")?,
                schema_format: r.read_string("schema_format")?,
                schema_name: r.read_string("schema_name")?,
                schema: r.read_bytes()?.to_vec(),
            }),
            RecordKind::Message => Self::Message(MessageRecord {
                channel_id: r.read_u32()?,
                sequence: r.read_u32()?,
                timestamp: r.read_u64()?,
                data: r.rest().to_vec(),
            }),
            RecordKind::Chunk => Self::Chunk(ChunkRecord {
                decompressed_size: r.read_u64()?,
                decompressed_crc: r.read_u32()?,
                compression: r.read_string("compression")?,
                data: r.rest().to_vec(),
            }),
            RecordKind::IndexData => Self::IndexData(r.rest().to_vec()),
            RecordKind::ChunkInfo => Self::ChunkInfo(r.rest().to_vec()),
            RecordKind::Footer => Self::Footer(Footer {
                index_offset: r.read_u64()?,
                index_crc: r.read_u32()?,
            }),
        };

        if r.remaining() > 0 {
            return Err(WireError::TrailingBodyBytes {
                kind,
                extra: r.remaining(),
            });
        }

        Ok(record)
    }

    /// Serialize the record body (without the opcode/length envelope).
    ///
    /// # Errors
    ///
    /// [`WireError::FieldTooLong`] if a prefixed field exceeds `u32::MAX`.
    pub fn encode_body(&self) -> Result<Vec<u8>, WireError> {
        let mut buf = Vec::new();
        match self {
            Self::ChannelInfo(info) => {
                put_u32(&mut buf, info.id);
                put_string(&mut buf, &info.topic)?;
                put_string(&mut buf, &info.schema_format)?;
                put_string(&mut buf, &info.schema_name)?;
                put_bytes(&mut buf, &info.schema)?;
            }
            Self::Message(msg) => {
                put_u32(&mut buf, msg.channel_id);
                put_u32(&mut buf, msg.sequence);
                put_u64(&mut buf, msg.timestamp);
                buf.extend_from_slice(&msg.data);
            }
            Self::Chunk(chunk) => {
                put_u64(&mut buf, chunk.decompressed_size);
                put_u32(&mut buf, chunk.decompressed_crc);
                put_string(&mut buf, &chunk.compression)?;
                buf.extend_from_slice(&chunk.data);
            }
            Self::IndexData(body) | Self::ChunkInfo(body) => buf.extend_from_slice(body),
            Self::Footer(footer) => {
                put_u64(&mut buf, footer.index_offset);
                put_u32(&mut buf, footer.index_crc);
            }
        }
        Ok(buf)
    }

    /// Write the full record (envelope + body) to `w`.
    ///
    /// Wire layout written:
    ///   1. opcode as a single byte
    ///   2. body length as u64 little-endian
    ///   3. body bytes
    ///
    /// # Returns
    ///
    /// Total number of bytes written.
    ///
    /// # Errors
    ///
    /// [`WireError::FieldTooLong`] from body encoding, or
    /// [`WireError::Io`] if the writer fails.
    pub fn write_to(&self, w: &mut impl std::io::Write) -> Result<usize, WireError> {
        let body = self.encode_body()?;
        w.write_all(&[self.kind().opcode()])?;
        w.write_all(&(body.len() as u64).to_le_bytes())?;
        w.write_all(&body)?;
        Ok(RECORD_PREFIX_LEN + body.len())
    }
}
