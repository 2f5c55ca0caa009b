use std::time::Instant;

use crate::buffer::ByteArena;
use crate::collector::{DecodedMessage, Subscriptions};
use crate::config::StreamConfig;
use crate::dispatch::RecordDispatcher;
use crate::error::ProtocolError;
use crate::time::{RequestWindow, Time};
use crate::transport::Transport;

/// Runs one retrieval: pulls increments from a transport into a byte
/// arena and advances the dispatcher over them until the transport ends.
///
/// ```text
///   transport ──increment──▶ ByteArena ──unread──▶ RecordDispatcher
///        ▲                       │   ◀──consumed──┘
///        └──── next_chunk ◀──────┘
/// ```
///
/// Each driver is single-use and owns all retrieval state, so concurrent
/// retrievals share nothing mutable.
#[derive(Clone, Debug)]
pub struct StreamDriver {
    config: StreamConfig,
    window: RequestWindow,
    subscriptions: Subscriptions,
}

impl StreamDriver {
    #[must_use]
    pub fn new(config: StreamConfig, window: RequestWindow, subscriptions: Subscriptions) -> Self {
        Self {
            config,
            window,
            subscriptions,
        }
    }

    /// Drive `transport` to its end.
    ///
    /// The transport is read until it reports end of stream, even after
    /// the trailing magic, so that trailing data is detected. Empty
    /// increments are skipped.
    ///
    /// # Errors
    ///
    /// The first [`ProtocolError`] encountered. No messages are returned
    /// on failure.
    pub async fn run<T: Transport>(self, mut transport: T) -> Result<Vec<DecodedMessage>, ProtocolError> {
        let started = Instant::now();
        let mut dispatcher = RecordDispatcher::new(&self.config, self.window, self.subscriptions);
        let mut arena = ByteArena::new(self.config.compaction_threshold);
        let mut received: u64 = 0;

        let result = async {
            loop {
                let chunk = match transport.next_chunk().await {
                    Ok(Some(chunk)) => chunk,
                    Ok(None) => break,
                    Err(error) => {
                        tracing::warn!(error = %error, received, "transport failed");
                        return Err(error.into());
                    }
                };
                if chunk.is_empty() {
                    continue;
                }
                received += chunk.len() as u64;

                arena.extend(&chunk);
                let consumed = dispatcher.advance(arena.unread())?;
                arena.consume(consumed);
            }
            dispatcher.finish(arena.len())
        }
        .await;

        if let Ok(messages) = &result {
            tracing::debug!(
                messages = messages.len(),
                bytes = received,
                elapsed_ms = started.elapsed().as_millis(),
                "retrieval complete"
            );
        }
        result
    }
}

/// Retrieve every message on `topics` received in `[start, end]`.
///
/// # Example
///
/// ```rust
/// use mcap_encoder::McapEncoder;
/// use mcap_stream::{MemoryTransport, Subscriptions, Time, retrieve};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let stream = McapEncoder::new()
///     .add_channel(1, "/count", "ros1", "pkg/Count", b"uint32 n")
///     .add_message(1, 2_000_000_000, &7u32.to_le_bytes())
///     .encode()
///     .unwrap();
///
/// let messages = retrieve(
///     MemoryTransport::split(stream, 5),
///     Time { sec: 1, nsec: 0 },
///     Time { sec: 3, nsec: 0 },
///     Subscriptions::All,
/// )
/// .await
/// .unwrap();
/// assert_eq!(messages[0].message, serde_json::json!({ "n": 7 }));
/// # }
/// ```
///
/// # Errors
///
/// See [`ProtocolError`].
pub async fn retrieve<T: Transport>(
    transport: T,
    start: Time,
    end: Time,
    topics: Subscriptions,
) -> Result<Vec<DecodedMessage>, ProtocolError> {
    retrieve_with_config(transport, RequestWindow::new(start, end), topics, StreamConfig::default()).await
}

/// [`retrieve`] with explicit limits.
///
/// # Errors
///
/// See [`ProtocolError`].
pub async fn retrieve_with_config<T: Transport>(
    transport: T,
    window: RequestWindow,
    topics: Subscriptions,
    config: StreamConfig,
) -> Result<Vec<DecodedMessage>, ProtocolError> {
    StreamDriver::new(config, window, topics).run(transport).await
}
