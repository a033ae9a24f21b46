use crate::config::Config;
use crate::decode::{decode_image, SUPPORTED_FORMATS};
use crate::engine::OcrEngine;
use crate::engines::EngineRegistry;
use crate::error::NotesError;
use crate::export::{ExportFormat, Exporter};
use crate::language::Language;
use crate::pipeline::{BatchPipeline, ExtractOptions, Section};
use crate::preprocessing::Preset;
use crate::session::{HistoryEntry, Profile, Session};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

/// Upper bound on images in one extract request
pub const MAX_IMAGES_PER_REQUEST: usize = 32;

/// Shared application state
///
/// The session lock is async: handlers wait on it with `lock().await`, while
/// the extract worker holds it via `blocking_lock()` for a whole batch.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<BatchPipeline>,
    pub exporter: Arc<Exporter>,
    pub session: Arc<Mutex<Session>>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(engine: Arc<dyn OcrEngine>, exporter: Exporter, config: Config) -> Self {
        Self {
            pipeline: Arc::new(BatchPipeline::new(engine)),
            exporter: Arc::new(exporter),
            session: Arc::new(Mutex::new(Session::new(config.default_language))),
            config: Arc::new(config),
        }
    }
}

/// Extraction response
#[derive(Serialize)]
pub struct ExtractResponse {
    pub sections: Vec<Section>,
    pub full_text: String,
    pub history_len: usize,
    pub processing_time_ms: u64,
}

#[derive(Serialize, Deserialize)]
pub struct ExportRequest {
    pub text: String,
    pub format: ExportFormat,
}

#[derive(Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub field: String,
    pub value: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Server info response
#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub engine: String,
    pub engine_description: String,
    pub supported_formats: Vec<String>,
    pub supported_languages: Vec<Language>,
    pub export_formats: Vec<ExportFormat>,
    pub max_file_size_bytes: usize,
    pub default_language: Language,
}

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    let body_limit = state
        .config
        .max_file_size
        .saturating_mul(MAX_IMAGES_PER_REQUEST);

    Router::new()
        .route("/extract", post(handle_extract))
        .route("/export", post(handle_export))
        .route("/history", get(handle_history).delete(handle_clear_history))
        .route("/profile", get(handle_get_profile).put(handle_set_profile))
        .route("/health", get(handle_health))
        .route("/info", get(handle_info))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server
pub async fn run(config: Config) -> anyhow::Result<()> {
    let registry = EngineRegistry::new(&config.engine)?;
    let engine = registry.default_engine();
    let exporter = Exporter::new(&config.pdf)?;
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "Using {} engine ({}), available: {}",
        engine.name(),
        engine.description(),
        registry.list().join(", ")
    );

    let app = router(AppState::new(engine, exporter, config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Images and options pulled out of an extract request
struct ExtractForm {
    images: Vec<Bytes>,
    language: Option<Language>,
    preprocessing: Preset,
}

async fn read_extract_form(
    multipart: &mut Multipart,
    max_file_size: usize,
) -> Result<ExtractForm, NotesError> {
    let mut form = ExtractForm {
        images: Vec::new(),
        language: None,
        preprocessing: Preset::default(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| NotesError::InvalidRequest(format!("Failed to parse multipart: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "image" | "file" => {
                let mime = field.content_type().map(|s| s.to_string());
                if let Some(mime) = mime.as_deref() {
                    if !SUPPORTED_FORMATS.contains(&mime) {
                        tracing::warn!("Received image with content type: {}", mime);
                    }
                }

                let data = field.bytes().await.map_err(|e| {
                    NotesError::InvalidRequest(format!("Failed to read image data: {}", e))
                })?;
                if data.len() > max_file_size {
                    return Err(NotesError::ImageTooLarge {
                        size: data.len(),
                        max: max_file_size,
                    });
                }
                if form.images.len() == MAX_IMAGES_PER_REQUEST {
                    return Err(NotesError::InvalidRequest(format!(
                        "At most {} images per request",
                        MAX_IMAGES_PER_REQUEST
                    )));
                }
                form.images.push(data);
            }
            "language" => {
                let value = field.text().await.map_err(|e| {
                    NotesError::InvalidRequest(format!("Invalid language: {}", e))
                })?;
                if !value.trim().is_empty() {
                    form.language = Some(value.parse()?);
                }
            }
            "preprocess" => {
                let value = field.text().await.map_err(|e| {
                    NotesError::InvalidRequest(format!("Invalid preprocess value: {}", e))
                })?;
                form.preprocessing = Preset::from_param(&value).ok_or_else(|| {
                    NotesError::InvalidRequest(format!(
                        "Unknown preprocess value '{}' (expected true, false, none, enhance or photo)",
                        value
                    ))
                })?;
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    Ok(form)
}

/// Handle batch extraction requests
async fn handle_extract(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, NotesError> {
    let start = Instant::now();
    let form = read_extract_form(&mut multipart, state.config.max_file_size).await?;

    if form.images.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let options = ExtractOptions {
        language: form.language,
        preprocessing: form.preprocessing,
    };

    // Decoding and OCR are CPU-bound
    let worker = state.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let images = form
            .images
            .iter()
            .enumerate()
            .map(|(i, data)| decode_image(data).map_err(|e| e.at_image(i + 1)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut session = worker.session.blocking_lock();
        let result = worker
            .pipeline
            .extract(&mut session, images, &options, |done, total| {
                tracing::debug!("Extracted image {}/{}", done, total);
            })?;
        Ok::<_, NotesError>(result.map(|r| (r, session.history().len())))
    })
    .await
    .map_err(|e| NotesError::Internal(format!("Extraction task failed: {}", e)))??;

    let Some((result, history_len)) = outcome else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let processing_time_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        "Extract request completed in {}ms, {} section(s)",
        processing_time_ms,
        result.sections.len()
    );

    Ok(Json(ExtractResponse {
        sections: result.sections,
        full_text: result.full_text,
        history_len,
        processing_time_ms,
    })
    .into_response())
}

/// Handle export requests; the response body is the document itself
async fn handle_export(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, NotesError> {
    let export = state.exporter.export(&request.text, request.format)?;

    Ok((
        [
            (header::CONTENT_TYPE, export.mime_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.file_name),
            ),
        ],
        export.bytes,
    )
        .into_response())
}

async fn handle_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    let session = state.session.lock().await;
    Json(session.history().list().to_vec())
}

async fn handle_clear_history(State(state): State<AppState>) -> StatusCode {
    state.session.lock().await.history_mut().clear();
    StatusCode::NO_CONTENT
}

async fn handle_get_profile(State(state): State<AppState>) -> Json<Profile> {
    let session = state.session.lock().await;
    Json(session.profile().clone())
}

async fn handle_set_profile(
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, NotesError> {
    let mut session = state.session.lock().await;
    session.profile_mut().set(&update.field, &update.value)?;
    tracing::info!("Profile field '{}' updated", update.field);
    Ok(Json(session.profile().clone()))
}

/// Handle health check requests
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handle info requests
async fn handle_info(State(state): State<AppState>) -> impl IntoResponse {
    let engine = state.pipeline.engine();
    Json(InfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine: engine.name().to_string(),
        engine_description: engine.description().to_string(),
        supported_formats: SUPPORTED_FORMATS.iter().map(|s| s.to_string()).collect(),
        supported_languages: engine.supported_languages(),
        export_formats: vec![
            ExportFormat::PlainText,
            ExportFormat::WordDocument,
            ExportFormat::Pdf,
        ],
        max_file_size_bytes: state.config.max_file_size,
        default_language: state.config.default_language,
    })
}
