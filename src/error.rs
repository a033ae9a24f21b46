use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotesError {
    #[error("Failed to initialize OCR engine: {0}")]
    Initialization(String),

    #[error("Failed to decode image{}: {reason}", image_label(.index))]
    ImageDecode { index: Option<usize>, reason: String },

    #[error("OCR failed{}: {reason}", image_label(.index))]
    OcrFailure { index: Option<usize>, reason: String },

    #[error("Preprocessing failed: {0}")]
    Preprocessing(String),

    #[error("Cannot export as {format}: {reason}")]
    ExportEncoding { format: &'static str, reason: String },

    #[error("Invalid value: {0}")]
    Validation(String),

    #[error("Image too large: {size} bytes (max: {max} bytes)")]
    ImageTooLarge { size: usize, max: usize },

    #[error("Missing image in request")]
    MissingFile,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn image_label(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" for image {}", i),
        None => String::new(),
    }
}

impl NotesError {
    pub fn ocr(reason: impl Into<String>) -> Self {
        Self::OcrFailure {
            index: None,
            reason: reason.into(),
        }
    }

    pub fn decode(reason: impl Into<String>) -> Self {
        Self::ImageDecode {
            index: None,
            reason: reason.into(),
        }
    }

    /// Tag a per-image failure with the 1-based position of the image in its batch.
    pub fn at_image(self, position: usize) -> Self {
        match self {
            Self::OcrFailure { reason, .. } => Self::OcrFailure {
                index: Some(position),
                reason,
            },
            Self::ImageDecode { reason, .. } => Self::ImageDecode {
                index: Some(position),
                reason,
            },
            other => other,
        }
    }

    /// The 1-based image index this failure refers to, if any.
    pub fn image_index(&self) -> Option<usize> {
        match self {
            Self::OcrFailure { index, .. } | Self::ImageDecode { index, .. } => *index,
            _ => None,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_index: Option<usize>,
}

impl IntoResponse for NotesError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            NotesError::Initialization(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INIT_ERROR"),
            NotesError::ImageDecode { .. } => (StatusCode::BAD_REQUEST, "IMAGE_DECODE_ERROR"),
            NotesError::OcrFailure { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "OCR_FAILURE"),
            NotesError::Preprocessing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PREPROCESSING_ERROR")
            }
            NotesError::ExportEncoding { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "EXPORT_ENCODING_ERROR")
            }
            NotesError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            NotesError::ImageTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, "IMAGE_TOO_LARGE")
            }
            NotesError::MissingFile => (StatusCode::BAD_REQUEST, "MISSING_FILE"),
            NotesError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            NotesError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            NotesError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            image_index: self.image_index(),
        });

        (status, body).into_response()
    }
}
