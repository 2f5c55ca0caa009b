use crate::error::WireError;
use crate::kind::RecordKind;
use crate::record::{Record, RECORD_PREFIX_LEN};

/// Default ceiling on a single record body (64 MiB).
///
/// The length field is a u64, so without a ceiling one corrupt byte
/// can make the reader wait forever for data that will never come.
pub const DEFAULT_MAX_RECORD_LEN: u64 = 64 * 1024 * 1024;

/// Incremental record tokenizer.
///
/// `RecordReader` never owns input. It is handed the unconsumed front
/// of a growing buffer and reports either a complete record together
/// with the number of bytes it occupied, or that more bytes are needed.
/// The caller advances its own cursor by the consumed count.
///
/// ```text
/// ┌──────────────────────────────────────────────────┐
/// │ opcode   u8                                      │
/// │ length   u64 LE                                  │
/// │ body     [length bytes]                          │
/// └──────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug)]
pub struct RecordReader {
    max_record_len: u64,
}

impl Default for RecordReader {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordReader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_record_len: DEFAULT_MAX_RECORD_LEN,
        }
    }

    #[must_use]
    pub fn with_max_record_len(max_record_len: u64) -> Self {
        Self { max_record_len }
    }

    #[must_use]
    pub fn max_record_len(&self) -> u64 {
        self.max_record_len
    }

    /// Read the next record from the front of `buf`.
    ///
    /// The opcode is validated as soon as the first byte is present, and
    /// the length as soon as the envelope is complete, so garbage fails
    /// fast instead of stalling for a body that never arrives.
    ///
    /// # Returns
    ///
    /// - `Some((record, consumed))` when a whole record is buffered.
    /// - `None` when `buf` holds only part of a record (or nothing).
    ///
    /// # Errors
    ///
    /// - [`WireError::UnknownOpcode`] for an unrecognised first byte.
    /// - [`WireError::RecordTooLarge`] if the declared length exceeds the
    ///   configured ceiling.
    /// - Any body-level error from [`Record::decode_body`].
    pub fn read_record(&self, buf: &[u8]) -> Result<Option<(Record, usize)>, WireError> {
        let Some(&op) = buf.first() else {
            return Ok(None);
        };
        let kind = RecordKind::from_opcode(op).ok_or(WireError::UnknownOpcode { opcode: op })?;

        if buf.len() < RECORD_PREFIX_LEN {
            return Ok(None);
        }

        let len = u64::from_le_bytes([
            buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7], buf[8],
        ]);
        if len > self.max_record_len {
            return Err(WireError::RecordTooLarge {
                kind,
                len,
                limit: self.max_record_len,
            });
        }

        // Bounded by max_record_len above, so this only fails on targets
        // whose usize is narrower than the configured ceiling.
        let total = usize::try_from(len)
            .ok()
            .and_then(|len| len.checked_add(RECORD_PREFIX_LEN))
            .ok_or(WireError::RecordTooLarge {
                kind,
                len,
                limit: self.max_record_len,
            })?;

        if buf.len() < total {
            return Ok(None);
        }

        let record = Record::decode_body(kind, &buf[RECORD_PREFIX_LEN..total])?;
        Ok(Some((record, total)))
    }

    /// Iterate the records of a complete, self-contained byte run.
    ///
    /// Used for decompressed chunk contents, where there is no "more
    /// bytes later": a partial record at the end is an error.
    #[must_use]
    pub fn records<'a>(&self, buf: &'a [u8]) -> Records<'a> {
        Records {
            reader: *self,
            buf,
            pos: 0,
            done: false,
        }
    }
}

/// Iterator returned by [`RecordReader::records`].
///
/// Yields `(offset, record)` pairs, where `offset` is the record's
/// position within the run. Stops after the first error.
pub struct Records<'a> {
    reader: RecordReader,
    buf: &'a [u8],
    pos: usize,
    done: bool,
}

impl Iterator for Records<'_> {
    type Item = Result<(usize, Record), WireError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos == self.buf.len() {
            return None;
        }

        match self.reader.read_record(&self.buf[self.pos..]) {
            Ok(Some((record, consumed))) => {
                let offset = self.pos;
                self.pos += consumed;
                Some(Ok((offset, record)))
            }
            Ok(None) => {
                self.done = true;
                Some(Err(WireError::UnexpectedEof {
                    offset: self.buf.len(),
                }))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
