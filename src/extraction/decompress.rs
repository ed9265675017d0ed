//! Payload decompression

use crate::error::ExtractError;
use flate2::read::GzDecoder;
use std::io::Read;

/// Turns a request body into the container bytes
///
/// Implementations must be pure: the same input yields the same output or the same error.
pub trait Decompressor: Send + Sync {
    /// Decompress `bytes` into an owned buffer
    fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>, ExtractError>;
}

/// Gzip decompression with an output ceiling
#[derive(Debug, Clone, Copy)]
pub struct GzipDecompressor {
    limit: u64,
}

impl GzipDecompressor {
    /// Create a decompressor that refuses to produce more than `limit` bytes
    pub fn new(limit: u64) -> Self {
        Self { limit }
    }

    /// Maximum decompressed size in bytes
    pub fn limit(&self) -> u64 {
        self.limit
    }
}

impl Decompressor for GzipDecompressor {
    fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>, ExtractError> {
        let mut out = Vec::new();
        // Read one byte past the limit so an exactly-full payload is still accepted.
        GzDecoder::new(bytes)
            .take(self.limit.saturating_add(1))
            .read_to_end(&mut out)
            .map_err(|e| ExtractError::DecompressionFailure {
                reason: e.to_string(),
            })?;

        if out.len() as u64 > self.limit {
            return Err(ExtractError::PayloadTooLarge { limit: self.limit });
        }
        Ok(out)
    }
}

/// Pass-through for bodies that are already decompressed
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Decompressor for Identity {
    fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>, ExtractError> {
        Ok(bytes.to_vec())
    }
}
