use std::collections::HashMap;

use mcap_schema::{MessageDecoder, MessageDefinition, SchemaError};
use mcap_wire::ChannelInfo;

use crate::error::ProtocolError;

/// A registered channel: its info as first seen, plus the decoder
/// resolved from it. Never mutated after registration.
#[derive(Clone, Debug)]
pub struct ChannelEntry {
    pub info: ChannelInfo,
    pub decoder: MessageDecoder,
}

impl ChannelEntry {
    #[must_use]
    pub fn definitions(&self) -> &[MessageDefinition] {
        self.decoder.definitions()
    }
}

/// Channel id → schema binding for one retrieval.
///
/// A channel id names exactly one schema. Repeating an identical
/// ChannelInfo is harmless (recorders write one per chunk); changing any
/// field under an existing id rejects the stream.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    channels: HashMap<u32, ChannelEntry>,
}

impl ChannelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `info`, resolving its decoder on first sight.
    ///
    /// The decoder is resolved whether or not anyone subscribed to the
    /// topic, so an unsupported schema fails the stream either way.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::ConflictingChannelInfo`] if the id is known
    ///   with a different info.
    /// - [`ProtocolError::UnsupportedSchemaFormat`] for format tags other
    ///   than `ros1` / `ros2`.
    /// - [`ProtocolError::InvalidSchema`] if the schema text does not
    ///   parse or names undefined types.
    pub fn register(&mut self, info: ChannelInfo) -> Result<(), ProtocolError> {
        if let Some(existing) = self.channels.get(&info.id) {
            if existing.info != info {
                return Err(ProtocolError::ConflictingChannelInfo {
                    channel_id: info.id,
                });
            }
            return Ok(());
        }

        let decoder = MessageDecoder::resolve_tag(&info.schema_format, &info.schema_name, &info.schema)
            .map_err(|source| match source {
                SchemaError::UnsupportedFormat { format } => ProtocolError::UnsupportedSchemaFormat {
                    channel_id: info.id,
                    format,
                },
                source => ProtocolError::InvalidSchema {
                    channel_id: info.id,
                    source,
                },
            })?;

        tracing::debug!(
            channel_id = info.id,
            topic = %info.topic,
            schema_format = %info.schema_format,
            schema_name = %info.schema_name,
            "registered channel"
        );
        self.channels.insert(info.id, ChannelEntry { info, decoder });
        Ok(())
    }

    #[must_use]
    pub fn lookup(&self, id: u32) -> Option<&ChannelEntry> {
        self.channels.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
