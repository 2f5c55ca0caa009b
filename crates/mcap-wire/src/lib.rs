#![warn(clippy::pedantic)]

pub mod compression;
pub mod error;
pub mod field;
pub mod kind;
pub mod magic;
pub mod reader;
pub mod record;

pub use compression::Compression;
pub use error::WireError;
pub use kind::RecordKind;
pub use magic::{Magic, MAGIC_LEN, SUPPORTED_VERSION};
pub use reader::{RecordReader, Records};
pub use record::{ChannelInfo, ChunkRecord, Footer, MessageRecord, Record};
