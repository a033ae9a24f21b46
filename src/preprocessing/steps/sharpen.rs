use crate::error::NotesError;
use image::DynamicImage;
use imageproc::filter::filter3x3;

/// Laplacian sharpening to crisp up pen strokes softened by camera focus
pub fn apply(image: DynamicImage) -> Result<DynamicImage, NotesError> {
    let gray = image.to_luma8();
    let kernel: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];
    let sharpened = filter3x3(&gray, &kernel);
    Ok(DynamicImage::ImageLuma8(sharpened))
}
