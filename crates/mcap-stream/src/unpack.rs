use mcap_wire::{ChunkRecord, Compression};

use crate::error::ProtocolError;

/// Turns a Chunk record back into the record bytes it wraps.
///
/// The declared decompressed size is both the allocation hint and the
/// expected result length; any disagreement fails the chunk. The CRC
/// field is not checked.
#[derive(Clone, Copy, Debug)]
pub struct ChunkUnpacker {
    max_decompressed_size: u64,
}

impl ChunkUnpacker {
    #[must_use]
    pub fn new(max_decompressed_size: u64) -> Self {
        Self {
            max_decompressed_size,
        }
    }

    /// Decompress `chunk.data`.
    ///
    /// Uncompressed chunks hand back their body without copying, and
    /// their declared size is not checked.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::DecompressionFailed`] if the compression tag is
    /// unknown, the declared size exceeds the configured limit, the codec
    /// rejects the data, or the output length differs from the declared
    /// size.
    pub fn unpack(&self, chunk: ChunkRecord) -> Result<Vec<u8>, ProtocolError> {
        let fail = |reason: String| ProtocolError::DecompressionFailed {
            compression: chunk.compression.clone(),
            reason,
        };

        let algorithm = Compression::from_tag(&chunk.compression)
            .ok_or_else(|| fail("unknown compression".to_string()))?;
        let decompress: fn(&[u8], usize) -> Result<Vec<u8>, String> = match algorithm {
            Compression::None => return Ok(chunk.data),
            Compression::Lz4 => {
                |data, size| lz4_flex::block::decompress(data, size).map_err(|e| e.to_string())
            }
            Compression::Zstd => {
                |data, size| zstd::bulk::decompress(data, size).map_err(|e| e.to_string())
            }
        };

        if chunk.decompressed_size > self.max_decompressed_size {
            return Err(fail(format!(
                "declared size {} exceeds limit {}",
                chunk.decompressed_size, self.max_decompressed_size
            )));
        }
        let declared = usize::try_from(chunk.decompressed_size)
            .map_err(|_| fail("declared size does not fit in memory".to_string()))?;
        let output = decompress(&chunk.data, declared).map_err(fail)?;

        if output.len() != declared {
            return Err(fail(format!(
                "decompressed to {} bytes, declared {declared}",
                output.len()
            )));
        }

        tracing::debug!(
            compression = %chunk.compression,
            compressed = chunk.data.len(),
            decompressed = declared,
            "unpacked chunk"
        );
        Ok(output)
    }
}
