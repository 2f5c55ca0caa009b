use std::fmt;

/// Record opcodes as they appear in the first byte of every record.
pub mod opcode {
    pub const CHANNEL_INFO: u8 = 0x01;
    pub const MESSAGE: u8 = 0x02;
    pub const CHUNK: u8 = 0x03;
    pub const INDEX_DATA: u8 = 0x04;
    pub const CHUNK_INFO: u8 = 0x05;
    pub const FOOTER: u8 = 0x06;
}

/// The kind of a container record.
///
/// ```text
/// ┌────────┬─────────────┬──────────────────────────────────────┐
/// │ Opcode │ Kind        │ Description                          │
/// ├────────┼─────────────┼──────────────────────────────────────┤
/// │ 0x01   │ ChannelInfo │ Binds a channel id to topic + schema │
/// │ 0x02   │ Message     │ One timestamped payload on a channel │
/// │ 0x03   │ Chunk       │ Possibly-compressed run of records   │
/// │ 0x04   │ IndexData   │ Per-channel message index            │
/// │ 0x05   │ ChunkInfo   │ Chunk index entry                    │
/// │ 0x06   │ Footer      │ End of data, followed by magic       │
/// └────────┴─────────────┴──────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    ChannelInfo,
    Message,
    Chunk,
    IndexData,
    ChunkInfo,
    Footer,
}

impl RecordKind {
    /// Return the wire opcode for this kind.
    #[must_use]
    pub fn opcode(self) -> u8 {
        match self {
            Self::ChannelInfo => opcode::CHANNEL_INFO,
            Self::Message => opcode::MESSAGE,
            Self::Chunk => opcode::CHUNK,
            Self::IndexData => opcode::INDEX_DATA,
            Self::ChunkInfo => opcode::CHUNK_INFO,
            Self::Footer => opcode::FOOTER,
        }
    }

    /// Parse a wire opcode. Unknown opcodes return `None`.
    #[must_use]
    pub fn from_opcode(op: u8) -> Option<Self> {
        match op {
            opcode::CHANNEL_INFO => Some(Self::ChannelInfo),
            opcode::MESSAGE => Some(Self::Message),
            opcode::CHUNK => Some(Self::Chunk),
            opcode::INDEX_DATA => Some(Self::IndexData),
            opcode::CHUNK_INFO => Some(Self::ChunkInfo),
            opcode::FOOTER => Some(Self::Footer),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::ChannelInfo => "ChannelInfo",
            Self::Message => "Message",
            Self::Chunk => "Chunk",
            Self::IndexData => "IndexData",
            Self::ChunkInfo => "ChunkInfo",
            Self::Footer => "Footer",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
