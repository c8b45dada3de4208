//! Data chunk encoding and decoding
//!
//! Payloads travel in fixed 33-byte chunks: 32 data bytes, zero padded
//! when the payload runs out, followed by a CRC-8 of those 32 bytes.

use crate::checksum::checksum;

/// Data bytes per chunk
pub const CHUNK_DATA_LEN: usize = 32;

/// Encoded chunk size (data + checksum)
pub const CHUNK_LEN: usize = CHUNK_DATA_LEN + 1;

/// Chunk rejected by its checksum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChunkError {
    pub expected: u8,
    pub actual: u8,
}

/// Number of chunks needed to carry `len` payload bytes
pub const fn chunk_count(len: usize) -> usize {
    len.div_ceil(CHUNK_DATA_LEN)
}

/// Encode up to 32 bytes of payload into a chunk
///
/// Bytes beyond the first 32 are ignored; callers stride the payload.
pub fn encode_chunk(data: &[u8]) -> [u8; CHUNK_LEN] {
    let mut chunk = [0u8; CHUNK_LEN];
    let len = data.len().min(CHUNK_DATA_LEN);
    chunk[..len].copy_from_slice(&data[..len]);
    chunk[CHUNK_DATA_LEN] = checksum(&chunk[..CHUNK_DATA_LEN]);
    chunk
}

/// Validate a chunk and return its 32 data bytes, padding included
pub fn decode_chunk(chunk: &[u8; CHUNK_LEN]) -> Result<[u8; CHUNK_DATA_LEN], ChunkError> {
    let (data, crc) = chunk.split_at(CHUNK_DATA_LEN);
    let expected = checksum(data);
    let actual = crc[0];
    if expected != actual {
        return Err(ChunkError { expected, actual });
    }

    let mut out = [0u8; CHUNK_DATA_LEN];
    out.copy_from_slice(data);
    Ok(out)
}
