//! Image codec and data-URL helpers

use anyhow::{anyhow, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::DynamicImage;

/// Extract and decode the base64 payload of a data URL
/// (`data:image/*;base64,<payload>`). Everything up to and including the
/// `base64,` marker is treated as the prefix.
pub fn decode_data_url(payload: &str) -> Result<Vec<u8>> {
    let (_, encoded) = payload
        .split_once("base64,")
        .ok_or_else(|| anyhow!("missing base64 marker in data URL"))?;
    Ok(BASE64.decode(encoded.trim())?)
}

/// Wrap JPEG bytes as a base64 data URL.
pub fn to_jpeg_data_url(jpeg_bytes: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", BASE64.encode(jpeg_bytes))
}

/// Encode image to JPEG bytes
pub fn encode_jpeg(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    image.write_to(&mut buffer, image::ImageFormat::Jpeg)?;
    Ok(buffer.into_inner())
}
