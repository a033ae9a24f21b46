use crate::error::NotesError;
use image::DynamicImage;
use imageproc::filter::median_filter;

/// 3x3 median filter; removes sensor speckle from phone photos without
/// blurring pen strokes the way a Gaussian would
pub fn apply(image: DynamicImage) -> Result<DynamicImage, NotesError> {
    let gray = image.to_luma8();
    Ok(DynamicImage::ImageLuma8(median_filter(&gray, 1, 1)))
}
