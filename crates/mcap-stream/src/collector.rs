use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::time::{RequestWindow, Time};

/// One message that survived the window and topic filters.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DecodedMessage {
    pub topic: String,
    pub receive_time: Time,
    pub message: Value,
}

/// Keep `message` iff its receive time lies inside `window`.
#[must_use]
pub fn offer(message: DecodedMessage, window: &RequestWindow) -> Option<DecodedMessage> {
    window.contains(message.receive_time).then_some(message)
}

/// Accumulates messages for one retrieval, in the order they are offered.
///
/// Chunked messages arrive depth-first at the point their chunk sits in
/// the stream. Nothing is re-sorted, so output order is encounter order
/// even when chunks overlap in time.
#[derive(Debug)]
pub struct Collector {
    window: RequestWindow,
    messages: Vec<DecodedMessage>,
}

impl Collector {
    #[must_use]
    pub fn new(window: RequestWindow) -> Self {
        Self {
            window,
            messages: Vec::new(),
        }
    }

    /// Would a message received at `time` be kept? Lets callers skip
    /// decoding payloads that would be dropped anyway.
    #[must_use]
    pub fn admits(&self, time: Time) -> bool {
        self.window.contains(time)
    }

    /// Returns `true` if the message was kept.
    pub fn collect(&mut self, message: DecodedMessage) -> bool {
        match offer(message, &self.window) {
            Some(kept) => {
                self.messages.push(kept);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn into_messages(self) -> Vec<DecodedMessage> {
        self.messages
    }
}

/// Which topics a retrieval decodes.
///
/// Channels on other topics are still registered and validated; only
/// their payloads are skipped. An empty topic set decodes nothing but
/// still checks the whole stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Subscriptions {
    #[default]
    All,
    Topics(HashSet<String>),
}

impl Subscriptions {
    pub fn topics<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Topics(topics.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn contains(&self, topic: &str) -> bool {
        match self {
            Self::All => true,
            Self::Topics(topics) => topics.contains(topic),
        }
    }
}
