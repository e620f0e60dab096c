//! Payload decompression.
//!
//! Game builds are shipped compressed (usually zlib via `pako`-compatible
//! tooling, sometimes gzip or LZ4) and inflated in memory before bootstrap.

use flate2::read::{GzDecoder, ZlibDecoder};
use frame_config::Compression;
use frame_core::LoadError;
use std::io::Read;

/// First four bytes of every WebAssembly binary.
pub const WASM_MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6d];

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Compressed → raw byte transformation, run synchronously between
/// retrieval and bootstrap.
pub trait Decompressor: std::fmt::Debug {
    fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>, LoadError>;
}

impl Decompressor for Compression {
    fn decompress(&self, bytes: &[u8]) -> Result<Vec<u8>, LoadError> {
        let codec = match self {
            Compression::Auto => detect(bytes).ok_or_else(|| {
                LoadError::DecompressionFailed("unrecognized payload encoding".into())
            })?,
            other => *other,
        };

        match codec {
            Compression::Zlib => inflate(ZlibDecoder::new(bytes), "zlib"),
            Compression::Gzip => inflate(GzDecoder::new(bytes), "gzip"),
            Compression::Lz4 => unpack_lz4(bytes),
            Compression::None | Compression::Auto => Ok(bytes.to_vec()),
        }
    }
}

/// Guess the encoding from the leading bytes.
///
/// Size-prefixed LZ4 blocks carry no signature and are never detected;
/// configure `codec = "lz4"` explicitly for those.
pub fn detect(bytes: &[u8]) -> Option<Compression> {
    if bytes.starts_with(&GZIP_MAGIC) {
        return Some(Compression::Gzip);
    }
    if bytes.starts_with(&WASM_MAGIC) {
        return Some(Compression::None);
    }
    if let [cmf, flg, ..] = *bytes {
        // RFC 1950: CM = 8 (deflate), header checksum divisible by 31.
        let header = u16::from(cmf) << 8 | u16::from(flg);
        if cmf & 0x0f == 8 && header % 31 == 0 {
            return Some(Compression::Zlib);
        }
    }
    None
}

/// LZ4 block with a little-endian `u32` size prefix.  The block must expand
/// to exactly the declared size.
fn unpack_lz4(bytes: &[u8]) -> Result<Vec<u8>, LoadError> {
    let prefix: [u8; 4] = bytes
        .get(..4)
        .and_then(|p| p.try_into().ok())
        .ok_or_else(|| LoadError::DecompressionFailed("lz4: missing size prefix".into()))?;
    let declared = u32::from_le_bytes(prefix) as usize;

    let out = lz4_flex::decompress_size_prepended(bytes)
        .map_err(|e| LoadError::DecompressionFailed(format!("lz4: {e}")))?;
    if out.len() != declared {
        return Err(LoadError::DecompressionFailed(format!(
            "lz4: declared {declared} bytes, got {}",
            out.len()
        )));
    }
    Ok(out)
}

fn inflate(mut decoder: impl Read, name: &str) -> Result<Vec<u8>, LoadError> {
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| LoadError::DecompressionFailed(format!("{name}: {e}")))?;
    Ok(out)
}
