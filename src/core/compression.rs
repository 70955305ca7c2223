use crate::utils::error::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use std::io::Write;

/// Serializes `value` to JSON text and gzips the UTF-8 bytes.
pub fn gzip_json<D>(value: &D) -> Result<Vec<u8>>
where
    D: Serialize + ?Sized,
{
    let json = serde_json::to_vec(value)?;
    gzip_bytes(&json)
}

pub fn gzip_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
