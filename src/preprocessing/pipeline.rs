use crate::error::NotesError;
use clap::ValueEnum;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::steps;

/// Preprocessing preset names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Pass images to OCR untouched
    None,
    /// Grayscale, then a 2x contrast boost
    #[default]
    Enhance,
    /// For phone photos: grayscale, resize, denoise, contrast boost, sharpen
    Photo,
}

impl Preset {
    /// Parse a request parameter. Booleans map to `enhance`/`none`.
    pub fn from_param(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "false" | "off" | "0" => Some(Self::None),
            "enhance" | "true" | "on" | "1" => Some(Self::Enhance),
            "photo" => Some(Self::Photo),
            _ => None,
        }
    }

    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            Self::Enhance
        } else {
            Self::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Enhance => "enhance",
            Self::Photo => "photo",
        }
    }
}

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: &'static str,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone)]
pub struct PreprocessingResult {
    pub image: DynamicImage,
    pub total_time_ms: u64,
    pub preset: Preset,
    pub steps: Vec<StepTiming>,
}

/// Applies the steps of a preset to one image at a time
#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    preset: Preset,
}

type Step = fn(DynamicImage) -> Result<DynamicImage, NotesError>;

const ENHANCE_STEPS: &[(&str, Step)] = &[
    ("grayscale", steps::grayscale::apply),
    ("contrast", steps::contrast::apply),
];

const PHOTO_STEPS: &[(&str, Step)] = &[
    ("grayscale", steps::grayscale::apply),
    ("resize", steps::resize::apply),
    ("denoise", steps::denoise::apply),
    ("contrast", steps::contrast::apply),
    ("sharpen", steps::sharpen::apply),
];

impl Preprocessor {
    pub fn new(preset: Preset) -> Self {
        Self { preset }
    }

    fn steps(&self) -> &'static [(&'static str, Step)] {
        match self.preset {
            Preset::None => &[],
            Preset::Enhance => ENHANCE_STEPS,
            Preset::Photo => PHOTO_STEPS,
        }
    }

    /// Process an image according to the configured preset
    pub fn process(&self, image: DynamicImage) -> Result<PreprocessingResult, NotesError> {
        let start = Instant::now();
        let mut timings = Vec::new();
        let mut img = image;

        for (name, step) in self.steps() {
            let step_start = Instant::now();
            img = step(img)?;
            timings.push(StepTiming {
                name: *name,
                time_ms: step_start.elapsed().as_millis() as u64,
            });
        }

        let result = PreprocessingResult {
            image: img,
            total_time_ms: start.elapsed().as_millis() as u64,
            preset: self.preset,
            steps: timings,
        };

        tracing::debug!(
            "Preprocessed with '{}' in {}ms: {:?}",
            self.preset.as_str(),
            result.total_time_ms,
            result.steps
        );

        Ok(result)
    }
}

/// Grayscale conversion followed by the fixed contrast boost
pub fn enhance(image: DynamicImage) -> Result<DynamicImage, NotesError> {
    Preprocessor::new(Preset::Enhance)
        .process(image)
        .map(|result| result.image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(20, 10, |x, _| {
            if x < 10 {
                Rgb([90, 90, 90])
            } else {
                Rgb([170, 170, 170])
            }
        }))
    }

    #[test]
    fn test_none_is_passthrough() {
        let input = sample();
        let result = Preprocessor::new(Preset::None).process(input.clone()).unwrap();
        assert_eq!(result.image, input);
        assert!(result.steps.is_empty());
    }

    #[test]
    fn test_enhance_is_grayscale_then_contrast() {
        let result = Preprocessor::new(Preset::Enhance).process(sample()).unwrap();
        let names: Vec<&str> = result.steps.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["grayscale", "contrast"]);

        let gray = result.image.as_luma8().expect("grayscale output");
        // mean 130; 90 -> 50, 170 -> 210
        assert_eq!(gray.get_pixel(0, 0).0[0], 50);
        assert_eq!(gray.get_pixel(15, 0).0[0], 210);
    }

    #[test]
    fn test_enhance_matches_helper() {
        let via_helper = enhance(sample()).unwrap();
        let via_pipeline = Preprocessor::new(Preset::Enhance).process(sample()).unwrap();
        assert_eq!(via_helper, via_pipeline.image);
    }

    #[test]
    fn test_photo_preset_upscales_small_images() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(50, 40, Luma([200])));
        let result = Preprocessor::new(Preset::Photo).process(img).unwrap();
        assert_eq!(result.image.width(), 150);
        assert_eq!(result.steps.len(), 5);
    }

    #[test]
    fn test_preset_from_param() {
        assert_eq!(Preset::from_param("true"), Some(Preset::Enhance));
        assert_eq!(Preset::from_param("false"), Some(Preset::None));
        assert_eq!(Preset::from_param("PHOTO"), Some(Preset::Photo));
        assert_eq!(Preset::from_param("sepia"), None);
    }
}
