#![warn(clippy::pedantic)]

pub mod decoder;
pub mod definition;
pub mod error;
pub mod format;

mod cdr;
mod compile;
mod ros1;
mod source;

pub use decoder::{MessageDecoder, Ros1Decoder, Ros2Decoder};
pub use definition::{ArrayKind, FieldDefinition, FieldType, MessageDefinition, PrimitiveType};
pub use error::SchemaError;
pub use format::SchemaFormat;
