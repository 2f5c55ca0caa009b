/// Append-only byte arena with a consumed-offset cursor.
///
/// Increments are appended at the back; the dispatcher consumes from
/// the front by advancing the cursor. Consumed bytes are dropped only
/// when the cursor passes the compaction threshold, so a stream of small
/// records does not shift the tail on every increment.
///
/// ```text
///   ┌───────────────┬──────────────────────┐
///   │ consumed      │ unread               │
///   └───────────────┴──────────────────────┘
///   0            cursor               buf.len()
/// ```
#[derive(Debug)]
pub struct ByteArena {
    buf: Vec<u8>,
    cursor: usize,
    compaction_threshold: usize,
}

impl ByteArena {
    #[must_use]
    pub fn new(compaction_threshold: usize) -> Self {
        Self {
            buf: Vec::new(),
            cursor: 0,
            compaction_threshold,
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    #[must_use]
    pub fn unread(&self) -> &[u8] {
        &self.buf[self.cursor..]
    }

    /// Mark `n` unread bytes as consumed.
    ///
    /// Clamped to the unread length.
    pub fn consume(&mut self, n: usize) {
        self.cursor = (self.cursor + n).min(self.buf.len());
        if self.cursor == self.buf.len() {
            // Nothing to preserve; reset without moving bytes.
            self.buf.clear();
            self.cursor = 0;
        } else if self.cursor >= self.compaction_threshold {
            self.buf.drain(..self.cursor);
            self.cursor = 0;
        }
    }

    /// Unread bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len() - self.cursor
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes held, consumed ones included.
    #[must_use]
    pub fn footprint(&self) -> usize {
        self.buf.len()
    }
}
