use crate::error::WireError;

/// Fixed bytes before the version digit: `\x89MCAP`.
///
/// The leading 0x89 has the high bit set so that tools which sniff for
/// 7-bit text never mistake a log for one, and the trailing `\r\n`
/// catches line-ending conversion by broken transfers.
pub const MAGIC_PREFIX: [u8; 5] = [0x89, b'M', b'C', b'A', b'P'];

/// Fixed bytes after the version digit.
pub const MAGIC_SUFFIX: [u8; 2] = [b'\r', b'\n'];

/// Total magic marker size in bytes.
pub const MAGIC_LEN: usize = 8;

/// The only format version this crate reads.
pub const SUPPORTED_VERSION: u8 = 1;

/// Position of the ASCII version digit inside the marker.
const VERSION_OFFSET: usize = 5;

/// The 8-byte marker that opens a stream and follows its Footer.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────┐
/// │ Offset │ Size    │ Description                  │
/// ├────────┼─────────┼──────────────────────────────┤
/// │ 0x00   │ 5 bytes │ "\x89MCAP"                   │
/// │ 0x05   │ 1 byte  │ Format version, ASCII digit  │
/// │ 0x06   │ 2 bytes │ "\r\n"                       │
/// └────────┴─────────┴──────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Magic {
    pub format_version: u8,
}

impl Magic {
    #[must_use]
    pub fn new(format_version: u8) -> Self {
        Self { format_version }
    }

    /// A marker carrying [`SUPPORTED_VERSION`].
    #[must_use]
    pub fn current() -> Self {
        Self::new(SUPPORTED_VERSION)
    }

    #[must_use]
    pub fn is_supported(self) -> bool {
        self.format_version == SUPPORTED_VERSION
    }

    /// Serialize the marker. Versions above 9 have no digit and produce
    /// a marker that [`Magic::probe`] rejects.
    #[must_use]
    pub fn to_bytes(self) -> [u8; MAGIC_LEN] {
        let mut out = [0u8; MAGIC_LEN];
        out[..VERSION_OFFSET].copy_from_slice(&MAGIC_PREFIX);
        out[VERSION_OFFSET] = b'0'.wrapping_add(self.format_version);
        out[VERSION_OFFSET + 1..].copy_from_slice(&MAGIC_SUFFIX);
        out
    }

    /// Write the marker, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::Io`] if the writer fails.
    pub fn write_to(self, w: &mut impl std::io::Write) -> Result<usize, WireError> {
        w.write_all(&self.to_bytes())?;
        Ok(MAGIC_LEN)
    }

    /// Probe the front of `buf` for a magic marker.
    ///
    /// Bytes are checked as far as they are available, so a stream that
    /// is clearly not a container fails on its first wrong byte rather
    /// than after 8 bytes have arrived.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((magic, MAGIC_LEN)))` when a full marker is present.
    /// - `Ok(None)` when `buf` is a valid but incomplete prefix.
    ///
    /// # Errors
    ///
    /// [`WireError::InvalidMagic`] on the first byte that cannot belong
    /// to a marker. The version is not checked against
    /// [`SUPPORTED_VERSION`]; that policy belongs to the caller.
    pub fn probe(buf: &[u8]) -> Result<Option<(Self, usize)>, WireError> {
        let available = &buf[..buf.len().min(MAGIC_LEN)];

        for (i, &byte) in available.iter().enumerate() {
            let valid = match i {
                0..VERSION_OFFSET => byte == MAGIC_PREFIX[i],
                VERSION_OFFSET => byte.is_ascii_digit(),
                _ => byte == MAGIC_SUFFIX[i - VERSION_OFFSET - 1],
            };
            if !valid {
                return Err(WireError::InvalidMagic {
                    found: available.to_vec(),
                });
            }
        }

        if available.len() < MAGIC_LEN {
            return Ok(None);
        }

        let format_version = available[VERSION_OFFSET] - b'0';
        Ok(Some((Self { format_version }, MAGIC_LEN)))
    }
}
