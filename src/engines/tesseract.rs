//! Tesseract engine implementation
//!
//! Uses the tesseract-static crate for static linking (no system dependencies).
//! Traineddata for each language is downloaded on first use.

use super::download::{cache_dir, ensure_downloaded};
use crate::config::EngineConfig;
use crate::engine::OcrEngine;
use crate::error::NotesError;
use crate::language::Language;
use image::DynamicImage;
use std::path::PathBuf;
use tesseract_static::tesseract::Tesseract;

/// Tesseract OCR Engine
pub struct TesseractEngine {
    tessdata_dir: PathBuf,
    /// Skip downloads when the user pointed us at their own tessdata
    managed: bool,
}

impl TesseractEngine {
    pub fn new(config: &EngineConfig) -> Result<Self, NotesError> {
        let (tessdata_dir, managed) = match &config.tessdata_path {
            Some(path) => (path.clone(), false),
            None => (cache_dir("tessdata")?, true),
        };

        let engine = Self {
            tessdata_dir,
            managed,
        };

        // English must load for the engine to be usable at all
        let probe = engine.open(Language::English)?;
        drop(probe);

        tracing::info!("Tesseract engine initialized (tessdata: {:?})", engine.tessdata_dir);

        Ok(engine)
    }

    fn open(&self, language: Language) -> Result<Tesseract, NotesError> {
        if self.managed {
            ensure_downloaded(
                &tessdata_url(language),
                &self.tessdata_dir,
                &format!("{}.traineddata", language.code()),
            )?;
        }

        let datapath = self
            .tessdata_dir
            .to_str()
            .ok_or_else(|| NotesError::Initialization("Invalid tessdata path".to_string()))?;

        Tesseract::new(Some(datapath), Some(language.code())).map_err(|e| {
            NotesError::ocr(format!(
                "Failed to initialize Tesseract for '{}': {}",
                language.code(),
                e
            ))
        })
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn description(&self) -> &'static str {
        "Tesseract OCR - multi-language, better for noisy phone photos"
    }

    fn recognize(
        &self,
        image: &DynamicImage,
        language: Language,
    ) -> Result<Vec<String>, NotesError> {
        self.check_language(language)?;

        let rgb_img = image.to_rgb8();
        let (width, height) = rgb_img.dimensions();

        // BMP is always supported by leptonica
        let mut bmp_data = Vec::new();
        rgb_img
            .write_to(&mut std::io::Cursor::new(&mut bmp_data), image::ImageFormat::Bmp)
            .map_err(|e| NotesError::ocr(format!("Failed to convert to BMP: {}", e)))?;

        let tess = self.open(language)?;

        let mut tess = tess.set_image_from_mem(&bmp_data).map_err(|e| {
            NotesError::ocr(format!(
                "Failed to set image ({}x{}, {} bytes): {}",
                width,
                height,
                bmp_data.len(),
                e
            ))
        })?;

        tess = tess
            .recognize()
            .map_err(|e| NotesError::ocr(format!("Failed to recognize text: {}", e)))?;

        let text = tess
            .get_text()
            .map_err(|e| NotesError::ocr(format!("Failed to get text: {}", e)))?;

        Ok(split_lines(&text))
    }

    fn supported_languages(&self) -> Vec<Language> {
        Language::ALL.to_vec()
    }
}

/// tessdata_fast keeps downloads small
fn tessdata_url(language: Language) -> String {
    format!(
        "https://github.com/tesseract-ocr/tessdata_fast/raw/main/{}.traineddata",
        language.code()
    )
}

/// Tesseract ends pages with newlines and a form feed; drop those trailing
/// blanks but keep blank lines between paragraphs
fn split_lines(text: &str) -> Vec<String> {
    let trimmed = text.trim_end_matches(|c: char| c.is_whitespace() || c == '\u{c}');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.lines().map(|l| l.to_string()).collect()
}
