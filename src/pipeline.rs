//! Batch extraction pipeline
//!
//! Runs OCR over an ordered batch of images, one at a time, and accumulates
//! the results into a single document with a `--- Image N ---` header per
//! image. Completed batches are recorded in the session history.

use crate::engine::OcrEngine;
use crate::error::NotesError;
use crate::language::Language;
use crate::preprocessing::{Preprocessor, Preset};
use crate::session::{HistoryEntry, Session};
use image::DynamicImage;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Header inserted before the text of image `index` (1-based)
pub fn section_header(index: usize) -> String {
    format!("\n\n--- Image {} ---\n", index)
}

/// OCR output of one image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub sections: Vec<Section>,
    pub full_text: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Explicit language hint; falls back to the profile's preferred language
    pub language: Option<Language>,
    pub preprocessing: Preset,
}

impl ExtractOptions {
    pub fn new(language: Option<Language>, preprocessing_enabled: bool) -> Self {
        Self {
            language,
            preprocessing: Preset::from_enabled(preprocessing_enabled),
        }
    }
}

pub struct BatchPipeline {
    engine: Arc<dyn OcrEngine>,
}

impl BatchPipeline {
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &dyn OcrEngine {
        self.engine.as_ref()
    }

    /// OCR `images` in order and record the combined text in the session history.
    ///
    /// `on_progress(completed, total)` is called after each image. An empty
    /// batch is a no-op and returns `Ok(None)`. The first failing image aborts
    /// the batch; nothing is recorded in that case.
    pub fn extract(
        &self,
        session: &mut Session,
        images: Vec<DynamicImage>,
        options: &ExtractOptions,
        mut on_progress: impl FnMut(usize, usize),
    ) -> Result<Option<ExtractionResult>, NotesError> {
        if images.is_empty() {
            tracing::debug!("Empty batch, nothing to extract");
            return Ok(None);
        }

        let language = options.language.unwrap_or(session.profile().language);
        self.engine.check_language(language)?;

        let total = images.len();
        let preprocessor = Preprocessor::new(options.preprocessing);
        let start = Instant::now();

        tracing::info!(
            "Extracting text from {} image(s) with {} (language: {}, preprocessing: {})",
            total,
            self.engine.name(),
            language,
            options.preprocessing.as_str()
        );

        let mut sections = Vec::with_capacity(total);
        let mut full_text = String::new();

        for (i, image) in images.into_iter().enumerate() {
            let index = i + 1;
            let text = self
                .recognize_one(&preprocessor, image, language)
                .map_err(|e| e.at_image(index))?;

            tracing::debug!("Image {}/{}: {} chars", index, total, text.len());

            full_text.push_str(&section_header(index));
            full_text.push_str(&text);
            sections.push(Section { index, text });

            on_progress(index, total);
        }

        session
            .history_mut()
            .record(HistoryEntry::new(full_text.clone()));

        tracing::info!(
            "Extracted {} chars from {} image(s) in {}ms",
            full_text.len(),
            total,
            start.elapsed().as_millis()
        );

        Ok(Some(ExtractionResult {
            sections,
            full_text,
        }))
    }

    fn recognize_one(
        &self,
        preprocessor: &Preprocessor,
        image: DynamicImage,
        language: Language,
    ) -> Result<String, NotesError> {
        let prepared = preprocessor.process(image)?;
        let lines = self.engine.recognize(&prepared.image, language)?;
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use std::sync::Mutex;

    /// Returns canned text keyed by image width
    struct ScriptedEngine {
        seen: Mutex<Vec<(u32, Language, bool)>>,
    }

    impl ScriptedEngine {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl OcrEngine for ScriptedEngine {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn description(&self) -> &'static str {
            "test engine"
        }

        fn recognize(
            &self,
            image: &DynamicImage,
            language: Language,
        ) -> Result<Vec<String>, NotesError> {
            let is_gray = matches!(image, DynamicImage::ImageLuma8(_));
            self.seen
                .lock()
                .unwrap()
                .push((image.width(), language, is_gray));
            match image.width() {
                1 => Ok(vec!["Hello".to_string()]),
                2 => Ok(vec!["World".to_string()]),
                3 => Ok(vec!["first line".to_string(), "second line".to_string()]),
                4 => Ok(vec![]),
                _ => Err(NotesError::ocr("unreadable")),
            }
        }

        fn supported_languages(&self) -> Vec<Language> {
            vec![Language::English, Language::Hindi]
        }
    }

    fn image(width: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(image::RgbImage::new(width, 2))
    }

    fn pipeline() -> (Arc<ScriptedEngine>, BatchPipeline) {
        let engine = Arc::new(ScriptedEngine::new());
        (engine.clone(), BatchPipeline::new(engine))
    }

    #[test]
    fn test_two_images_hello_world() {
        let (_, pipeline) = pipeline();
        let mut session = Session::default();

        let result = pipeline
            .extract(
                &mut session,
                vec![image(1), image(2)],
                &ExtractOptions::default(),
                |_, _| {},
            )
            .unwrap()
            .unwrap();

        assert_eq!(
            result.full_text,
            "\n\n--- Image 1 ---\nHello\n\n--- Image 2 ---\nWorld"
        );
        assert_eq!(result.sections.len(), 2);
        assert_eq!(result.sections[1].index, 2);
        assert_eq!(result.sections[1].text, "World");
    }

    #[test]
    fn test_headers_in_input_order() {
        let (_, pipeline) = pipeline();
        let mut session = Session::default();
        let images = vec![image(2), image(3), image(1), image(4), image(2)];

        let result = pipeline
            .extract(&mut session, images, &ExtractOptions::default(), |_, _| {})
            .unwrap()
            .unwrap();

        let mut last = 0;
        let mut rest = result.full_text.as_str();
        while let Some(pos) = rest.find("--- Image ") {
            rest = &rest[pos + "--- Image ".len()..];
            let end = rest.find(' ').unwrap();
            let n: usize = rest[..end].parse().unwrap();
            assert_eq!(n, last + 1);
            last = n;
        }
        assert_eq!(last, 5);
    }

    #[test]
    fn test_multiline_result_joined_with_newlines() {
        let (_, pipeline) = pipeline();
        let mut session = Session::default();

        let result = pipeline
            .extract(&mut session, vec![image(3)], &ExtractOptions::default(), |_, _| {})
            .unwrap()
            .unwrap();

        assert_eq!(result.sections[0].text, "first line\nsecond line");
    }

    #[test]
    fn test_empty_ocr_text_keeps_header() {
        let (_, pipeline) = pipeline();
        let mut session = Session::default();

        let result = pipeline
            .extract(&mut session, vec![image(4)], &ExtractOptions::default(), |_, _| {})
            .unwrap()
            .unwrap();

        assert_eq!(result.full_text, "\n\n--- Image 1 ---\n");
        assert_eq!(result.sections[0].text, "");
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let (engine, pipeline) = pipeline();
        let mut session = Session::default();
        let mut calls = 0;

        let result = pipeline
            .extract(&mut session, vec![], &ExtractOptions::default(), |_, _| calls += 1)
            .unwrap();

        assert!(result.is_none());
        assert!(session.history().is_empty());
        assert_eq!(calls, 0);
        assert!(engine.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_progress_reported_after_each_image() {
        let (_, pipeline) = pipeline();
        let mut session = Session::default();
        let mut progress = Vec::new();

        pipeline
            .extract(
                &mut session,
                vec![image(1), image(2), image(3)],
                &ExtractOptions::default(),
                |done, total| progress.push((done, total)),
            )
            .unwrap();

        assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_success_records_history() {
        let (_, pipeline) = pipeline();
        let mut session = Session::default();

        let result = pipeline
            .extract(&mut session, vec![image(1)], &ExtractOptions::default(), |_, _| {})
            .unwrap()
            .unwrap();

        let history = session.history().list();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].text(), result.full_text);
    }

    #[test]
    fn test_failure_reports_index_and_skips_history() {
        let (engine, pipeline) = pipeline();
        let mut session = Session::default();
        let mut progress = Vec::new();

        let err = pipeline
            .extract(
                &mut session,
                vec![image(1), image(9), image(2)],
                &ExtractOptions::default(),
                |done, total| progress.push((done, total)),
            )
            .unwrap_err();

        assert!(matches!(err, NotesError::OcrFailure { index: Some(2), .. }));
        assert!(session.history().is_empty());
        assert_eq!(progress, vec![(1, 3)]);
        // The third image is never attempted
        assert_eq!(engine.seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_unsupported_language_fails_before_any_image() {
        let (engine, pipeline) = pipeline();
        let mut session = Session::default();
        let options = ExtractOptions::new(Some(Language::Tamil), true);

        let err = pipeline
            .extract(&mut session, vec![image(1)], &options, |_, _| {})
            .unwrap_err();

        assert!(matches!(err, NotesError::OcrFailure { index: None, .. }));
        assert!(engine.seen.lock().unwrap().is_empty());
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_profile_language_used_without_hint() {
        let (engine, pipeline) = pipeline();
        let mut session = Session::new(Language::Hindi);

        pipeline
            .extract(&mut session, vec![image(1)], &ExtractOptions::default(), |_, _| {})
            .unwrap();

        assert_eq!(engine.seen.lock().unwrap()[0].1, Language::Hindi);
    }

    #[test]
    fn test_preprocessing_toggle() {
        let (engine, pipeline) = pipeline();
        let mut session = Session::default();

        pipeline
            .extract(
                &mut session,
                vec![image(1)],
                &ExtractOptions::new(None, false),
                |_, _| {},
            )
            .unwrap();
        pipeline
            .extract(
                &mut session,
                vec![image(1)],
                &ExtractOptions::new(None, true),
                |_, _| {},
            )
            .unwrap();

        let seen = engine.seen.lock().unwrap();
        assert!(!seen[0].2, "disabled preprocessing must pass the RGB image through");
        assert!(seen[1].2, "enabled preprocessing must hand OCR a grayscale image");
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn test_grayscale_input_accepted() {
        let (_, pipeline) = pipeline();
        let mut session = Session::default();
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([10])));

        let result = pipeline
            .extract(&mut session, vec![img], &ExtractOptions::default(), |_, _| {})
            .unwrap()
            .unwrap();
        assert_eq!(result.sections[0].text, "World");
    }
}
