use crate::error::NotesError;
use crate::language::Language;
use image::DynamicImage;

/// Trait that all OCR engines must implement
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "ocrs", "tesseract")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognize the text in a decoded image, one entry per text line
    fn recognize(
        &self,
        image: &DynamicImage,
        language: Language,
    ) -> Result<Vec<String>, NotesError>;

    /// Languages this engine can recognize
    fn supported_languages(&self) -> Vec<Language>;

    fn supports(&self, language: Language) -> bool {
        self.supported_languages().contains(&language)
    }

    /// Fail with `OcrFailure` unless `language` is supported
    fn check_language(&self, language: Language) -> Result<(), NotesError> {
        if self.supports(language) {
            Ok(())
        } else {
            Err(NotesError::ocr(format!(
                "language '{}' ({}) is not supported by the {} engine",
                language.code(),
                language.display_name(),
                self.name()
            )))
        }
    }
}
