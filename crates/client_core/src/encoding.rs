use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Input characters decoded per step. Must stay a multiple of 4 so padding
/// can only appear in the final chunk.
const DECODE_CHUNK_CHARS: usize = 4 * 512;

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("invalid base64 payload near offset {offset}: {source}")]
    InvalidBase64 {
        offset: usize,
        source: base64::DecodeError,
    },
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Reads the whole file and returns it base64-encoded, without any data-URL
/// prefix.
pub async fn file_to_base64(path: impl AsRef<Path>) -> std::io::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(encode_base64(&bytes))
}

/// Drops a leading `data:<mime>;base64,` prefix. Anything else is returned
/// unchanged.
pub fn strip_data_url_prefix(value: &str) -> &str {
    let Some(rest) = value.strip_prefix("data:") else {
        return value;
    };
    match rest.split_once(',') {
        Some((header, payload)) if header.ends_with(";base64") => payload,
        _ => value,
    }
}

pub fn base64_to_binary(encoded: &str) -> Result<Vec<u8>, EncodingError> {
    let encoded = strip_data_url_prefix(encoded.trim()).as_bytes();
    let mut bytes = Vec::with_capacity(encoded.len() / 4 * 3);
    for (index, chunk) in encoded.chunks(DECODE_CHUNK_CHARS).enumerate() {
        STANDARD
            .decode_vec(chunk, &mut bytes)
            .map_err(|source| EncodingError::InvalidBase64 {
                offset: index * DECODE_CHUNK_CHARS,
                source,
            })?;
    }
    Ok(bytes)
}

#[cfg(test)]
#[path = "tests/encoding_tests.rs"]
mod tests;
