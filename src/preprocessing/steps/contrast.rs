use crate::error::NotesError;
use image::{DynamicImage, GrayImage};

/// Contrast multiplier used by the `enhance` preset
pub const BOOST_FACTOR: f32 = 2.0;

/// Boost contrast around the mean luminance by `BOOST_FACTOR`
pub fn apply(image: DynamicImage) -> Result<DynamicImage, NotesError> {
    Ok(DynamicImage::ImageLuma8(boost(&image.to_luma8(), BOOST_FACTOR)))
}

/// out = mean + factor * (in - mean), clamped to 0..=255
///
/// The mean is rounded to a whole gray level first, so a uniform image is
/// left unchanged.
pub fn boost(gray: &GrayImage, factor: f32) -> GrayImage {
    let mean = mean_level(gray);
    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        let value = mean + factor * (pixel.0[0] as f32 - mean);
        pixel.0[0] = value.round().clamp(0.0, 255.0) as u8;
    }
    out
}

fn mean_level(gray: &GrayImage) -> f32 {
    let count = gray.width() as u64 * gray.height() as u64;
    if count == 0 {
        return 0.0;
    }
    let sum: u64 = gray.pixels().map(|p| p.0[0] as u64).sum();
    (sum as f64 / count as f64 + 0.5).floor() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_boost_spreads_values_from_mean() {
        // Two columns: 100 and 140, mean 120
        let img = GrayImage::from_fn(2, 1, |x, _| if x == 0 { Luma([100]) } else { Luma([140]) });
        let out = boost(&img, 2.0);
        assert_eq!(out.get_pixel(0, 0).0[0], 80);
        assert_eq!(out.get_pixel(1, 0).0[0], 160);
    }

    #[test]
    fn test_boost_clamps() {
        let img = GrayImage::from_fn(2, 1, |x, _| if x == 0 { Luma([10]) } else { Luma([250]) });
        let out = boost(&img, 2.0);
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
        assert_eq!(out.get_pixel(1, 0).0[0], 255);
    }

    #[test]
    fn test_uniform_image_unchanged() {
        let img = GrayImage::from_pixel(5, 5, Luma([128]));
        assert_eq!(boost(&img, 2.0), img);
    }

    #[test]
    fn test_empty_image() {
        let img = GrayImage::new(0, 0);
        assert_eq!(boost(&img, 2.0).dimensions(), (0, 0));
    }

    #[test]
    fn test_apply_is_deterministic() {
        let img = GrayImage::from_fn(16, 16, |x, y| Luma([((x * 13 + y * 7) % 256) as u8]));
        let a = apply(DynamicImage::ImageLuma8(img.clone())).unwrap();
        let b = apply(DynamicImage::ImageLuma8(img)).unwrap();
        assert_eq!(a.to_luma8(), b.to_luma8());
    }
}
