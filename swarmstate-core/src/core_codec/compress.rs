/*
    compress.rs - Size-bounded compression

    Compressed payloads are a single marker byte followed by a raw deflate
    stream. Encoded documents always start with 'd', so a reader can tell the
    two apart from the first byte and uncompressed data stays loadable.
*/

use crate::config::CompressionConfig;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::borrow::Cow;
use std::io::{Read, Write};
use thiserror::Error;

/// First byte of every compressed payload
pub const COMPRESSION_MARKER: u8 = b'z';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompressionError {
    #[error("decompressed size exceeds limit of {limit} bytes")]
    LimitExceeded { limit: usize },

    #[error("corrupt compressed data: {0}")]
    Corrupt(String),

    #[error("compression failed: {0}")]
    Failed(String),
}

/// Deflate `data` at `level` (clamped to 9), writing `prefix` first
pub fn compress(data: &[u8], level: u32, prefix: &[u8]) -> Result<Vec<u8>, CompressionError> {
    let mut out = Vec::with_capacity(prefix.len() + data.len() / 2);
    out.extend_from_slice(prefix);
    let mut encoder = DeflateEncoder::new(out, Compression::new(level.min(9)));
    encoder
        .write_all(data)
        .map_err(|e| CompressionError::Failed(e.to_string()))?;
    encoder.finish().map_err(|e| CompressionError::Failed(e.to_string()))
}

/// Inflate a raw deflate stream. `max_size` of 0 means unbounded.
///
/// Never inflates more than `max_size + 1` bytes, so a small hostile payload
/// cannot balloon in memory before the limit check.
pub fn decompress(data: &[u8], max_size: usize) -> Result<Vec<u8>, CompressionError> {
    let decoder = DeflateDecoder::new(data);
    let mut out = Vec::new();
    let read = if max_size == 0 {
        let mut decoder = decoder;
        decoder.read_to_end(&mut out)
    } else {
        decoder.take((max_size as u64).saturating_add(1)).read_to_end(&mut out)
    };
    read.map_err(|e| CompressionError::Corrupt(e.to_string()))?;

    if max_size > 0 && out.len() > max_size {
        return Err(CompressionError::LimitExceeded { limit: max_size });
    }
    Ok(out)
}

/// Applies the configured compression policy to outgoing payloads and
/// transparently unpacks incoming ones.
#[derive(Debug, Clone)]
pub struct Compressor {
    enabled: bool,
    level: u32,
    threshold: usize,
}

impl Compressor {
    pub fn new(config: &CompressionConfig) -> Self {
        Compressor {
            enabled: config.enabled,
            level: config.level,
            threshold: config.threshold_bytes,
        }
    }

    /// Compressor that never compresses; `unpack` still handles marked input
    pub fn disabled() -> Self {
        Compressor { enabled: false, level: 0, threshold: 0 }
    }

    /// Compress `encoded` if enabled, at or above the threshold, and the result
    /// is actually smaller. Otherwise the input is returned as is.
    pub fn pack(&self, encoded: Vec<u8>) -> Vec<u8> {
        if !self.enabled || encoded.len() < self.threshold {
            return encoded;
        }
        match compress(&encoded, self.level, &[COMPRESSION_MARKER]) {
            Ok(packed) if packed.len() < encoded.len() => packed,
            Ok(_) => encoded,
            Err(e) => {
                tracing::warn!(error = %e, "compression failed, storing uncompressed");
                encoded
            }
        }
    }

    /// Decompress if the marker is present, otherwise borrow the input
    pub fn unpack<'a>(&self, data: &'a [u8], max_size: usize) -> Result<Cow<'a, [u8]>, CompressionError> {
        match data.split_first() {
            Some((&COMPRESSION_MARKER, body)) => decompress(body, max_size).map(Cow::Owned),
            _ => Ok(Cow::Borrowed(data)),
        }
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Compressor::new(&CompressionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(threshold: usize) -> Compressor {
        Compressor::new(&CompressionConfig { enabled: true, level: 6, threshold_bytes: threshold })
    }

    #[test]
    fn test_compress_decompress() {
        let data = b"hello hello hello hello hello hello".repeat(20);
        let packed = compress(&data, 6, &[]).unwrap();
        assert!(packed.len() < data.len());
        assert_eq!(decompress(&packed, 0).unwrap(), data);
    }

    #[test]
    fn test_prefix_is_written_first() {
        let packed = compress(b"abc", 1, b"zz").unwrap();
        assert_eq!(&packed[..2], b"zz");
        assert_eq!(decompress(&packed[2..], 0).unwrap(), b"abc");
    }

    #[test]
    fn test_decompress_limit_exceeded() {
        let data = vec![0u8; 10 * 1024 * 1024];
        let packed = compress(&data, 9, &[]).unwrap();
        let err = decompress(&packed, 1024 * 1024).unwrap_err();
        assert_eq!(err, CompressionError::LimitExceeded { limit: 1024 * 1024 });
    }

    #[test]
    fn test_decompress_exact_limit_ok() {
        let data = vec![7u8; 4096];
        let packed = compress(&data, 6, &[]).unwrap();
        assert_eq!(decompress(&packed, 4096).unwrap().len(), 4096);
        assert!(decompress(&packed, 4095).is_err());
    }

    #[test]
    fn test_decompress_largest_limit() {
        let packed = compress(b"abc", 6, &[]).unwrap();
        assert_eq!(decompress(&packed, usize::MAX).unwrap(), b"abc");
    }

    #[test]
    fn test_decompress_garbage() {
        let err = decompress(&[0xff, 0xff, 0xff, 0xff], 0).unwrap_err();
        assert!(matches!(err, CompressionError::Corrupt(_)));
    }

    #[test]
    fn test_pack_below_threshold_is_raw() {
        let c = enabled(1024);
        let data = b"d1:ai1ee".to_vec();
        assert_eq!(c.pack(data.clone()), data);
    }

    #[test]
    fn test_pack_unpack() {
        let c = enabled(16);
        let data = [b"d1:n".as_slice(), &b"x".repeat(500), b"e"].concat();
        let packed = c.pack(data.clone());
        assert_eq!(packed[0], COMPRESSION_MARKER);
        assert_eq!(c.unpack(&packed, 0).unwrap().as_ref(), data.as_slice());
    }

    #[test]
    fn test_pack_keeps_raw_when_not_smaller() {
        let c = enabled(0);
        let data = b"d1:ae".to_vec();
        assert_eq!(c.pack(data.clone()), data);
    }

    #[test]
    fn test_unpack_raw_borrows() {
        let c = Compressor::disabled();
        let data = b"de";
        assert!(matches!(c.unpack(data, 0).unwrap(), Cow::Borrowed(_)));
    }
}
