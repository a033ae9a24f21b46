//! Handwritten notes to editable documents
//!
//! Photos of handwritten pages are decoded, optionally cleaned up, run
//! through an OCR engine one at a time and stitched into a single text with
//! a `--- Image N ---` header per page. The text can be exported as plain
//! text, DOCX or PDF. The HTTP service and the CLI in `main.rs` are thin
//! hosts around these modules.

pub mod cli;
pub mod config;
pub mod decode;
pub mod engine;
pub mod engines;
pub mod error;
pub mod export;
pub mod language;
pub mod pipeline;
pub mod preprocessing;
pub mod server;
pub mod session;

pub use engine::OcrEngine;
pub use error::NotesError;
pub use export::{Export, ExportFormat, Exporter};
pub use language::Language;
pub use pipeline::{BatchPipeline, ExtractOptions, ExtractionResult};
pub use session::Session;
