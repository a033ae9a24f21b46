//! Image preprocessing applied before OCR
//!
//! Handwriting photos are converted to grayscale and contrast-boosted so
//! strokes separate from the paper background.

pub mod pipeline;
pub mod steps;

pub use pipeline::{enhance, PreprocessingResult, Preprocessor, Preset, StepTiming};
