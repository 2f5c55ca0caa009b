use crate::error::WireError;

// ── Encoding helpers ──────────────────────────────────────────────────
//
// Every record body is a flat run of little-endian fields. Strings and
// byte blobs carry a u32 length prefix; the final field of Message and
// Chunk bodies is unprefixed and runs to the end of the body.

pub fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub fn put_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Append a `u32`-length-prefixed byte field.
///
/// # Errors
///
/// [`WireError::FieldTooLong`] if `data` does not fit a `u32` prefix.
pub fn put_bytes(buf: &mut Vec<u8>, data: &[u8]) -> Result<(), WireError> {
    let len =
        u32::try_from(data.len()).map_err(|_| WireError::FieldTooLong { len: data.len() })?;
    put_u32(buf, len);
    buf.extend_from_slice(data);
    Ok(())
}

/// # Errors
///
/// [`WireError::FieldTooLong`] if `value` does not fit a `u32` prefix.
pub fn put_string(buf: &mut Vec<u8>, value: &str) -> Result<(), WireError> {
    put_bytes(buf, value.as_bytes())
}

// ── Decoding ──────────────────────────────────────────────────────────

/// Cursor over a single record body.
///
/// The body has already been cut to its declared length by the
/// tokenizer, so running out of bytes here means the body itself is
/// malformed, not that more input is needed.
pub struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or(WireError::UnexpectedEof { offset: self.pos })?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] if fewer than 4 bytes remain.
    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] if fewer than 8 bytes remain.
    pub fn read_u64(&mut self) -> Result<u64, WireError> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Read a `u32`-length-prefixed byte field.
    ///
    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] if the prefix or payload is cut short.
    pub fn read_bytes(&mut self) -> Result<&'a [u8], WireError> {
        let len = self.read_u32()? as usize;
        self.take(len)
    }

    /// Read a length-prefixed UTF-8 string. `field` names it in errors.
    ///
    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] on truncation,
    /// [`WireError::InvalidUtf8`] on bad encoding.
    pub fn read_string(&mut self, field: &'static str) -> Result<String, WireError> {
        let bytes = self.read_bytes()?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| WireError::InvalidUtf8 { field })
    }

    /// Consume and return everything left in the body.
    pub fn rest(&mut self) -> &'a [u8] {
        let rest = &self.buf[self.pos..];
        self.pos = self.buf.len();
        rest
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }
}
