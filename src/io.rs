use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};
use std::fs;
use std::path::Path;

/// Decode a coloring page to RGBA at its natural resolution.
///
/// The decode step gives natural, not displayed, dimensions — everything
/// downstream (line-art analysis, the allowed mask, the colored map) is
/// resolution-native.
pub fn decode_page(path: &Path) -> Result<RgbaImage, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to decode '{}': {}", path.display(), e))?;
    Ok(img.to_rgba8())
}

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, String> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(img.as_raw(), img.width(), img.height(), ColorType::Rgba8)
        .map_err(|e| format!("PNG encode error: {}", e))?;
    Ok(bytes)
}

/// Encode and write an RGBA image to a PNG file.
pub fn write_png(img: &RgbaImage, path: &Path) -> Result<(), String> {
    let bytes = encode_png(img)?;
    fs::write(path, bytes).map_err(|e| format!("Failed to write '{}': {}", path.display(), e))
}
