//! OCRS engine implementation
//!
//! Pure Rust OCR engine using the ocrs library. No system dependencies required.
//! Downloads neural network models automatically on first use. Latin script only.

use super::download::{cache_dir, ensure_downloaded};
use crate::config::EngineConfig;
use crate::engine::OcrEngine;
use crate::error::NotesError;
use crate::language::Language;
use image::DynamicImage;
use ocrs::{DecodeMethod, ImageSource, OcrEngine as OcrsOcrEngine, OcrEngineParams};
use rten::Model;

/// Default model URLs from the ocrs project
const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

/// OCR Engine wrapping the ocrs library
pub struct OcrsEngine {
    engine: OcrsOcrEngine,
}

impl OcrsEngine {
    /// Load the detection and recognition models, downloading them if needed
    pub fn new(_config: &EngineConfig) -> Result<Self, NotesError> {
        let models = cache_dir("models")?;
        let detection_model_path =
            ensure_downloaded(DETECTION_MODEL_URL, &models, "text-detection.rten")?;
        let recognition_model_path =
            ensure_downloaded(RECOGNITION_MODEL_URL, &models, "text-recognition.rten")?;

        let detection_model = Model::load_file(&detection_model_path).map_err(|e| {
            NotesError::Initialization(format!("Failed to load detection model: {}", e))
        })?;
        let recognition_model = Model::load_file(&recognition_model_path).map_err(|e| {
            NotesError::Initialization(format!("Failed to load recognition model: {}", e))
        })?;

        let engine = OcrsOcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method: DecodeMethod::Greedy,
            ..Default::default()
        })
        .map_err(|e| NotesError::Initialization(format!("Failed to create OCR engine: {}", e)))?;

        tracing::info!("ocrs engine initialized");

        Ok(Self { engine })
    }
}

impl OcrEngine for OcrsEngine {
    fn name(&self) -> &'static str {
        "ocrs"
    }

    fn description(&self) -> &'static str {
        "Pure Rust neural OCR - fast, no system dependencies, Latin script only"
    }

    fn recognize(
        &self,
        image: &DynamicImage,
        language: Language,
    ) -> Result<Vec<String>, NotesError> {
        self.check_language(language)?;

        // ImageSource::from_bytes expects RGB8 in HWC layout
        let rgb_img = image.to_rgb8();
        let dimensions = rgb_img.dimensions();

        let img_source = ImageSource::from_bytes(rgb_img.as_raw(), dimensions)
            .map_err(|e| NotesError::ocr(format!("Failed to create image source: {}", e)))?;

        let ocr_input = self
            .engine
            .prepare_input(img_source)
            .map_err(|e| NotesError::ocr(format!("Failed to prepare input: {}", e)))?;

        let word_rects = self
            .engine
            .detect_words(&ocr_input)
            .map_err(|e| NotesError::ocr(format!("Failed to detect words: {}", e)))?;

        let line_rects = self.engine.find_text_lines(&ocr_input, &word_rects);

        let line_texts = self
            .engine
            .recognize_text(&ocr_input, &line_rects)
            .map_err(|e| NotesError::ocr(format!("Failed to recognize text: {}", e)))?;

        let lines: Vec<String> = line_texts
            .iter()
            .filter_map(|line| line.as_ref())
            .map(|line| {
                line.words()
                    .map(|word| word.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        tracing::debug!(
            "ocrs recognized {} line(s) in {}x{} image",
            lines.len(),
            dimensions.0,
            dimensions.1
        );

        Ok(lines)
    }

    fn supported_languages(&self) -> Vec<Language> {
        vec![Language::English]
    }
}
