//! Document export: plain text, DOCX and PDF
//!
//! Every exporter is a pure function of its input text and options; no
//! timestamps or other run-dependent metadata end up in the output.

pub mod docx;
pub mod pdf;
pub mod text;

mod font;

use crate::error::NotesError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum ExportFormat {
    #[serde(rename = "txt", alias = "text")]
    #[value(name = "txt", alias = "text")]
    PlainText,
    #[serde(rename = "docx", alias = "word")]
    #[value(name = "docx", alias = "word")]
    WordDocument,
    #[serde(rename = "pdf")]
    #[value(name = "pdf")]
    Pdf,
}

impl ExportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::PlainText => "notes.txt",
            Self::WordDocument => "notes.docx",
            Self::Pdf => "notes.pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::PlainText => "text/plain",
            Self::WordDocument => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Pdf => "application/pdf",
        }
    }
}

/// What the PDF exporter does with characters its font cannot draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnencodablePolicy {
    /// Substitute `?` and log how many characters were replaced
    #[default]
    Replace,
    /// Fail the export, naming the first offending character
    Strict,
}

#[derive(Debug, Clone, Default)]
pub struct PdfOptions {
    /// TrueType/OpenType font to embed; the built-in Courier is used otherwise
    pub font_path: Option<PathBuf>,
    pub unencodable: UnencodablePolicy,
}

/// Encoded document ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub bytes: Vec<u8>,
    pub file_name: &'static str,
    pub mime_type: &'static str,
}

/// Produces export files; holds the loaded PDF font, if one is configured
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    unencodable: UnencodablePolicy,
    font_data: Option<Vec<u8>>,
}

impl Exporter {
    pub fn new(options: &PdfOptions) -> Result<Self, NotesError> {
        let font_data = match &options.font_path {
            Some(path) => {
                let data = std::fs::read(path).map_err(|e| {
                    NotesError::Initialization(format!("Failed to read PDF font {:?}: {}", path, e))
                })?;
                font::validate(&data).map_err(|reason| {
                    NotesError::Initialization(format!(
                        "{:?} is not a usable PDF font: {}",
                        path, reason
                    ))
                })?;
                tracing::info!("Embedding PDF font from {:?}", path);
                Some(data)
            }
            None => None,
        };

        Ok(Self {
            unencodable: options.unencodable,
            font_data,
        })
    }

    pub fn export(&self, text: &str, format: ExportFormat) -> Result<Export, NotesError> {
        let bytes = match format {
            ExportFormat::PlainText => text::encode(text),
            ExportFormat::WordDocument => docx::encode(text)?,
            ExportFormat::Pdf => {
                let font = match &self.font_data {
                    Some(data) => font::PdfFont::embedded(data)?,
                    None => font::PdfFont::courier(),
                };
                pdf::encode(text, &font, self.unencodable)?
            }
        };

        tracing::debug!(
            "Exported {} chars as {} ({} bytes)",
            text.chars().count(),
            format.file_name(),
            bytes.len()
        );

        Ok(Export {
            bytes,
            file_name: format.file_name(),
            mime_type: format.mime_type(),
        })
    }
}

/// Export with the default options (built-in font, `?` substitution)
pub fn export(text: &str, format: ExportFormat) -> Result<Export, NotesError> {
    Exporter::default().export(text, format)
}
