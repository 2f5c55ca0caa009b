/// Implementation of `mcap validate`.
///
/// Runs a complete retrieval (all time, all topics) and reports either a
/// series of success checkmarks (`✓`) or one diagnostic line (`✗`).
///
/// # Success output
///
/// ```text
/// ✓ Framing: leading magic, footer and trailing magic present
/// ✓ Channels: every message references a registered channel
/// ✓ Messages: 42 messages decoded on 3 topics
/// ```
///
/// # Failure output
///
/// ```text
/// ✗ Error: stream ended early while reading body (17 bytes buffered)
/// ```
use std::collections::BTreeSet;

use anyhow::{Result, anyhow};
use mcap_stream::{ProtocolError, RequestWindow, StreamConfig, Subscriptions, retrieve_with_config};

use crate::ValidateArgs;
use crate::input;

/// Run the `mcap validate` command.
///
/// # Errors
///
/// Returns an error if the input cannot be opened or the stream fails
/// validation.
pub async fn run(args: &ValidateArgs) -> Result<()> {
    let config = StreamConfig::default();
    let transport = input::open(&args.file, config.read_chunk_size).await?;

    match retrieve_with_config(transport, RequestWindow::all(), Subscriptions::All, config).await {
        Ok(messages) => {
            let topics: BTreeSet<&str> = messages.iter().map(|m| m.topic.as_str()).collect();
            println!("✓ Framing: leading magic, footer and trailing magic present");
            println!("✓ Channels: every message references a registered channel");
            println!(
                "✓ Messages: {} message{} decoded on {} topic{}",
                messages.len(),
                plural(messages.len()),
                topics.len(),
                plural(topics.len())
            );
            Ok(())
        }
        Err(e) => {
            println!("✗ Error: {}", diagnostic(&e));
            Err(anyhow!("validation failed"))
        }
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

// ── Error formatting ──────────────────────────────────────────────────────────

/// Render a [`ProtocolError`] with its source chain on one line.
///
/// ```text
/// ┌──────────────────────┬───────────────────────────────────────────────┐
/// │ Variant              │ Diagnostic                                    │
/// ├──────────────────────┼───────────────────────────────────────────────┤
/// │ TruncatedStream      │ "stream ended early while <state> (...)"      │
/// │ DecodeFailed         │ "<Display>: <schema error>"                   │
/// │ InvalidSchema        │ "<Display>: <schema error>"                   │
/// │ others               │ "<Display>"                                   │
/// └──────────────────────┴───────────────────────────────────────────────┘
/// ```
fn diagnostic(e: &ProtocolError) -> String {
    match e {
        ProtocolError::TruncatedStream { state, buffered } => {
            format!("stream ended early while {state} ({buffered} bytes buffered)")
        }
        ProtocolError::DecodeFailed { source, .. } => format!("{e}: {source}"),
        ProtocolError::InvalidSchema { source, .. } => format!("{e}: {source}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use mcap_stream::ProtocolState;

    use super::*;

    #[test]
    fn truncated_diagnostic() {
        let e = ProtocolError::TruncatedStream {
            state: ProtocolState::ReadingBody,
            buffered: 17,
        };
        assert_snapshot!(diagnostic(&e), @"stream ended early while reading body (17 bytes buffered)");
    }

    #[test]
    fn plain_diagnostics() {
        assert_snapshot!(
            diagnostic(&ProtocolError::TrailingDataAfterFooter { extra: 3 }),
            @"3 bytes of data after the trailing magic"
        );
        assert_snapshot!(
            diagnostic(&ProtocolError::UnsupportedVersion { found: Some(2) }),
            @"unsupported format version 2"
        );
        assert_snapshot!(
            diagnostic(&ProtocolError::UnknownChannel { channel_id: 4 }),
            @"message for channel 4 with no prior channel info"
        );
    }
}
