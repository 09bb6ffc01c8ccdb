//! HTTP Endpoints
//!
//! REST API over the speech service.

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use log::{debug, error};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use crate::service::{SynthesisRequest, VoiceListing};
use crate::state::AppState;
use crate::VoicecraftError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/voices", get(get_voices))
        .route("/api/synthesize", post(synthesize))
        .route("/api/health", get(health_check))
        .route("/api/cleanup", post(cleanup))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Error body returned to clients: `{"error": message}`
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }

    /// Validation errors keep their message; anything else is logged and
    /// replaced by `public`
    fn from_core(err: VoicecraftError, public: &str) -> Self {
        if err.is_client_error() {
            return Self::bad_request(err.to_string());
        }
        error!("{}: {}", public, err);
        Self::internal(public)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Run blocking service work off the async worker threads
async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("Blocking task failed: {}", e);
        ApiError::internal("Internal server error")
    })
}

/// List personas and engine voices
async fn get_voices(State(state): State<AppState>) -> Result<Json<VoiceListing>, ApiError> {
    let service = state.service.clone();
    let listing = run_blocking(move || service.list_voices()).await?;
    Ok(Json(listing))
}

/// Synthesis request body
#[derive(Debug, Deserialize)]
struct SynthesizeBody {
    text: Option<String>,
    voice: Option<String>,
    speed: Option<Value>,
    pitch: Option<Value>,
    #[serde(default)]
    download: bool,
}

/// Read a speed or pitch factor, accepting numbers and numeric strings
fn factor(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(1.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(1.0),
        _ => 1.0,
    }
}

/// Synthesize text and return the WAV file
async fn synthesize(
    State(state): State<AppState>,
    body: Result<Json<SynthesizeBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        debug!("Rejected synthesis body: {}", rejection);
        match rejection {
            JsonRejection::MissingJsonContentType(_) => ApiError::bad_request("Text is required"),
            _ => ApiError::bad_request("Invalid request body"),
        }
    })?;

    let text = body
        .text
        .ok_or_else(|| ApiError::bad_request("Text is required"))?;

    let request = SynthesisRequest::new(
        &text,
        body.voice.as_deref(),
        factor(body.speed.as_ref()),
        factor(body.pitch.as_ref()),
        state.service.max_text_length(),
    )
    .map_err(|e| ApiError::from_core(e, "Failed to synthesize speech"))?;

    let service = state.service.clone();
    let (artifact, audio) = run_blocking(move || service.synthesize_wav(&request))
        .await?
        .map_err(|e| ApiError::from_core(e, "Failed to synthesize speech"))?;
    debug!(
        "Serving {} ({:.2}s)",
        artifact.path.display(),
        artifact.duration_secs()
    );

    let disposition = if body.download {
        "attachment; filename=\"speech.wav\""
    } else {
        "inline; filename=\"speech.wav\""
    };

    Ok((
        [
            (header::CONTENT_TYPE, "audio/wav"),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        audio,
    )
        .into_response())
}

/// Health check
async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let service = state.service.clone();
    let available = run_blocking(move || service.health_check()).await?;

    Ok(Json(json!({
        "status": "healthy",
        "tts_available": available,
    })))
}

/// Remove all generated files now
async fn cleanup(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let service = state.service.clone();
    let report = run_blocking(move || service.cleanup_now()).await?;

    Ok(Json(json!({
        "message": "Cleanup completed",
        "removed": report.removed,
        "missing": report.missing,
        "failed": report.failed,
    })))
}
