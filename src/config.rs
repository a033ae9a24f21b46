use crate::cli::{EngineArgs, ExportArgs, ServeArgs};
use crate::export::PdfOptions;
use crate::language::Language;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub default_language: Language,
    pub max_file_size: usize,
    pub engine: EngineConfig,
    pub pdf: PdfOptions,
}

/// OCR engine selection
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Engine name; `None` initializes every compiled engine and uses the first
    pub name: Option<String>,
    pub tessdata_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9292,
            default_language: Language::English,
            max_file_size: 20 * 1024 * 1024,
            engine: EngineConfig::default(),
            pdf: PdfOptions::default(),
        }
    }
}

impl From<ServeArgs> for Config {
    fn from(args: ServeArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            default_language: args.default_language,
            max_file_size: args.max_file_size,
            engine: args.engine.into(),
            pdf: args.export.into(),
        }
    }
}

impl From<EngineArgs> for EngineConfig {
    fn from(args: EngineArgs) -> Self {
        Self {
            name: args.engine,
            tessdata_path: args.tessdata_path,
        }
    }
}

impl From<ExportArgs> for PdfOptions {
    fn from(args: ExportArgs) -> Self {
        Self {
            font_path: args.pdf_font,
            unencodable: args.unencodable,
        }
    }
}
