use std::io::Cursor;

use mcap_wire::Compression;

use crate::error::EncodeError;

/// Default zstd compression level (1–22 scale).
///
/// Level 3 is zstd's own default and what recorders typically write.
const DEFAULT_ZSTD_LEVEL: i32 = 3;

/// Compress a chunk body with the given algorithm.
///
/// The output is always in `algorithm`'s format, even when it comes
/// out larger than the input.
///
/// ```text
/// ┌─────────────┬────────────────────────────────────┐
/// │ Compression │ Output                             │
/// ├─────────────┼────────────────────────────────────┤
/// │ None        │ input copied verbatim              │
/// │ Lz4         │ LZ4 block, no size prefix          │
/// │ Zstd        │ one zstd frame                     │
/// └─────────────┴────────────────────────────────────┘
/// ```
///
/// # Example
///
/// ```rust
/// use mcap_encoder::compression::compress;
/// use mcap_wire::Compression;
///
/// let data = b"abcabcabcabcabcabcabcabc".repeat(20);
/// let packed = compress(Compression::Lz4, &data).unwrap();
/// assert!(packed.len() < data.len());
/// ```
///
/// # Errors
///
/// [`EncodeError::CompressFailed`] if zstd reports a failure. LZ4 block
/// compression is infallible.
pub fn compress(algorithm: Compression, data: &[u8]) -> Result<Vec<u8>, EncodeError> {
    match algorithm {
        Compression::None => Ok(data.to_vec()),
        Compression::Lz4 => Ok(lz4_flex::block::compress(data)),
        Compression::Zstd => zstd::encode_all(Cursor::new(data), DEFAULT_ZSTD_LEVEL).map_err(|e| {
            EncodeError::CompressFailed {
                algorithm,
                reason: e.to_string(),
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_verbatim() {
        assert_eq!(compress(Compression::None, b"abc").unwrap(), b"abc");
    }

    #[test]
    fn lz4_block_decompresses_with_known_size() {
        let data = "float64 x\n".repeat(40);
        let packed = compress(Compression::Lz4, data.as_bytes()).unwrap();
        let unpacked = lz4_flex::block::decompress(&packed, data.len()).unwrap();
        assert_eq!(unpacked, data.as_bytes());
    }

    #[test]
    fn zstd_frame_decompresses() {
        let data = "string frame_id\n".repeat(40);
        let packed = compress(Compression::Zstd, data.as_bytes()).unwrap();
        assert!(packed.len() < data.len());
        let unpacked = zstd::decode_all(Cursor::new(packed)).unwrap();
        assert_eq!(unpacked, data.as_bytes());
    }

    #[test]
    fn empty_input_still_produces_a_frame() {
        let packed = compress(Compression::Zstd, &[]).unwrap();
        assert!(!packed.is_empty());
    }
}
