#![warn(clippy::pedantic)]

pub mod buffer;
pub mod collector;
pub mod config;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod registry;
pub mod time;
pub mod transport;
pub mod unpack;

pub use buffer::ByteArena;
pub use collector::{Collector, DecodedMessage, Subscriptions, offer};
pub use config::StreamConfig;
pub use dispatch::{ProtocolState, RecordDispatcher, RouteContext, dispatch};
pub use driver::{StreamDriver, retrieve, retrieve_with_config};
pub use error::{ParseTimeError, ProtocolError, TransportError};
pub use registry::{ChannelEntry, ChannelRegistry};
pub use time::{RequestWindow, Time};
pub use transport::{ChannelTransport, MemoryTransport, ReaderTransport, Transport};
pub use unpack::ChunkUnpacker;
