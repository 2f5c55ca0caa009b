/// Implementation of `mcap retrieve`.
///
/// Streams the input through the retrieval driver and prints each
/// collected message as one JSON object per line, in stream order:
///
/// ```text
/// {"topic":"/imu","receive_time":{"sec":2,"nsec":0},"message":{"x":1.5}}
/// {"topic":"/imu","receive_time":{"sec":2,"nsec":500000000},"message":{"x":1.75}}
/// ```
///
/// Nothing is printed when the stream is rejected: retrieval is
/// all-or-nothing.
use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use mcap_stream::{DecodedMessage, RequestWindow, StreamConfig, Subscriptions, Time, retrieve_with_config};
use tracing::debug;

use crate::RetrieveArgs;
use crate::input;

/// Run the `mcap retrieve` command.
///
/// # Errors
///
/// Returns an error if the input cannot be opened, the stream violates
/// the protocol, or stdout cannot be written.
pub async fn run(args: &RetrieveArgs) -> Result<()> {
    let window = RequestWindow::new(
        args.start.unwrap_or(Time::MIN),
        args.end.unwrap_or(Time::MAX),
    );
    let topics = if args.topics.is_empty() {
        Subscriptions::All
    } else {
        Subscriptions::topics(args.topics.iter().cloned())
    };
    let config = StreamConfig {
        read_chunk_size: args.read_chunk_size,
        ..StreamConfig::default()
    };

    let transport = input::open(&args.file, config.read_chunk_size).await?;
    let messages = retrieve_with_config(transport, window, topics, config)
        .await
        .with_context(|| format!("failed to retrieve from {}", args.file.display()))?;
    debug!(messages = messages.len(), ?window, "retrieval complete");

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for message in &messages {
        writeln!(out, "{}", json_line(message)?)?;
    }
    out.flush()?;
    Ok(())
}

/// Serialize one message as a single JSON line (no trailing newline).
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn json_line(message: &DecodedMessage) -> Result<String> {
    serde_json::to_string(message).context("failed to serialize message")
}
