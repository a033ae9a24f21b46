use crate::error::NotesError;
use image::DynamicImage;

/// Convert image to single-channel grayscale
pub fn apply(image: DynamicImage) -> Result<DynamicImage, NotesError> {
    if let DynamicImage::ImageLuma8(_) = image {
        return Ok(image);
    }
    Ok(DynamicImage::ImageLuma8(image.to_luma8()))
}
