use crate::error::NotesError;
use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Shorter side below which phone crops are upscaled
const MIN_SHORT_SIDE: u32 = 1000;
/// Never grow an image by more than this factor
const MAX_UPSCALE: f32 = 3.0;
/// Maximum dimension to avoid memory issues
const MAX_DIMENSION: u32 = 4000;

/// Bring an image into a size range where OCR engines do well.
/// Small crops are upscaled, very large photos are constrained.
pub fn apply(image: DynamicImage) -> Result<DynamicImage, NotesError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(NotesError::Preprocessing("image has no pixels".to_string()));
    }

    let short_side = width.min(height) as f32;
    let long_side = width.max(height) as f32;

    let mut scale = if short_side < MIN_SHORT_SIDE as f32 {
        (MIN_SHORT_SIDE as f32 / short_side).min(MAX_UPSCALE)
    } else {
        1.0
    };
    if long_side * scale > MAX_DIMENSION as f32 {
        scale = MAX_DIMENSION as f32 / long_side;
    }

    // Skip resize if the change is within 5%
    if (0.95..=1.05).contains(&scale) {
        return Ok(image);
    }

    let new_width = ((width as f32 * scale).round() as u32).max(1);
    let new_height = ((height as f32 * scale).round() as u32).max(1);
    Ok(image.resize_exact(new_width, new_height, FilterType::Lanczos3))
}
