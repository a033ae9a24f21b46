use crate::export::{ExportFormat, UnencodablePolicy};
use crate::language::Language;
use crate::preprocessing::Preset;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "handnotes")]
#[command(about = "Turn photos of handwritten notes into editable text, DOCX or PDF")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP service
    Serve(ServeArgs),
    /// OCR image files and write a single export file
    Extract(ExtractArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long, env = "HANDNOTES_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "HANDNOTES_PORT", default_value = "9292")]
    pub port: u16,

    /// Initial preferred OCR language of the session profile
    #[arg(long, env = "HANDNOTES_DEFAULT_LANGUAGE", default_value = "eng")]
    pub default_language: Language,

    /// Maximum upload size per image in bytes (default: 20MB)
    #[arg(long, env = "HANDNOTES_MAX_FILE_SIZE", default_value = "20971520")]
    pub max_file_size: usize,

    #[command(flatten)]
    pub engine: EngineArgs,

    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Images to OCR, in order (JPEG or PNG)
    #[arg(required = true)]
    pub images: Vec<PathBuf>,

    /// OCR language code (e.g. "eng", "hin", "tam")
    #[arg(short, long, env = "HANDNOTES_LANGUAGE", default_value = "eng")]
    pub language: Language,

    /// Preprocessing preset applied before OCR
    #[arg(short, long, value_enum, default_value = "enhance")]
    pub preprocess: Preset,

    /// Output format
    #[arg(short, long, value_enum, default_value = "txt")]
    pub format: ExportFormat,

    /// Output file (default: notes.<ext> in the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub engine: EngineArgs,

    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// OCR engine to use (default: first compiled engine)
    #[arg(long, env = "HANDNOTES_ENGINE")]
    pub engine: Option<String>,

    /// Path to tessdata directory (uses a download cache if not set)
    #[arg(long, env = "TESSDATA_PREFIX")]
    pub tessdata_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// TrueType/OpenType font to embed in PDFs (needed for non-Latin scripts)
    #[arg(long, env = "HANDNOTES_PDF_FONT")]
    pub pdf_font: Option<PathBuf>,

    /// What to do with characters the PDF font cannot represent
    #[arg(long, env = "HANDNOTES_UNENCODABLE", value_enum, default_value = "replace")]
    pub unencodable: UnencodablePolicy,
}
