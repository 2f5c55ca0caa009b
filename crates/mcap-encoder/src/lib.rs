#![warn(clippy::pedantic)]

pub mod compression;
pub mod encoder;
pub mod error;

pub use encoder::{ChunkBuilder, McapEncoder};
pub use error::EncodeError;
