//! Image acquisition boundary: turns uploaded or on-disk bytes into rasters

use crate::error::NotesError;
use image::{DynamicImage, ImageFormat};
use std::path::Path;

/// Formats accepted from uploads and camera captures
pub const SUPPORTED_FORMATS: [&str; 2] = ["image/jpeg", "image/png"];

/// Decode JPEG or PNG bytes
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, NotesError> {
    let format = image::guess_format(bytes)
        .map_err(|e| NotesError::decode(format!("unrecognized image data: {}", e)))?;

    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
        return Err(NotesError::decode(format!(
            "unsupported image format {:?} (expected JPEG or PNG)",
            format
        )));
    }

    let image = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| NotesError::decode(e.to_string()))?;

    tracing::debug!(
        "Decoded {:?} image: {}x{}",
        format,
        image.width(),
        image.height()
    );

    Ok(image)
}

/// Read and decode an image file
pub fn decode_file(path: &Path) -> Result<DynamicImage, NotesError> {
    let bytes = std::fs::read(path)?;
    decode_image(&bytes).map_err(|e| match e {
        NotesError::ImageDecode { index, reason } => NotesError::ImageDecode {
            index,
            reason: format!("{}: {}", path.display(), reason),
        },
        other => other,
    })
}
