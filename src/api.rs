use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::analysis::{AnalysisError, Analyzer};
use crate::domain::{validate_domain, InputError};
use crate::generator::GenerationError;
use crate::models::{AnalyzeParams, DebugInfo, ErrorBody, FailureBody};

const PROCESSING_ERROR: &str = "Error processing your request.";
const NON_SERIALIZABLE: &str = "An unexpected and non-serializable issue occurred.";
const RAW_ERROR_TYPE: &str = "object";

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/analyze-domain", get(analyze_domain))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn analyze_domain(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let params = AnalyzeParams::from_pairs(pairs);
    let domain = params.domain.as_deref();
    let url = match validate_domain(domain) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(domain = ?domain, "rejected request: {}", e);
            return ApiError::Input(e).into_response();
        }
    };
    // Validation guarantees a non-empty value here.
    let domain = domain.unwrap_or_default();

    match state.analyzer.analyze(&url, domain).await {
        Ok(result) => {
            tracing::info!(url = %url, vertical = %result.vertical, "domain analyzed");
            (StatusCode::OK, Json(vec![result])).into_response()
        }
        Err(e) => ApiError::Analysis(e).into_response(),
    }
}

// ── Error mapping ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Input(e) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response(),
            ApiError::Analysis(AnalysisError::Configuration) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: format!(
                        "Server configuration error: {}",
                        AnalysisError::Configuration
                    ),
                }),
            )
                .into_response(),
            ApiError::Analysis(AnalysisError::Generation(e)) => {
                tracing::error!(kind = e.kind(), error = %e, "domain analysis failed");
                let body = serde_json::to_value(failure_body(&e)).unwrap_or_else(|_| {
                    json!({
                        "error": PROCESSING_ERROR,
                        "details": NON_SERIALIZABLE,
                        "debugInfo": { "rawErrorType": RAW_ERROR_TYPE },
                    })
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

fn failure_body(e: &GenerationError) -> FailureBody {
    let mut debug_info = DebugInfo {
        raw_error_type: RAW_ERROR_TYPE.to_string(),
        kind: Some(e.kind().to_string()),
        name: Some(e.name().to_string()),
        message: Some(e.to_string()),
        llm_output: e.raw_output().map(str::to_string),
        ..DebugInfo::default()
    };

    match e {
        GenerationError::JsonParse { text, .. } => {
            debug_info.llm_output_attempt = Some(text.clone());
        }
        GenerationError::Upstream { status, body } => {
            debug_info.status = Some(*status);
            if !body.is_empty() {
                debug_info.cause = Some(body.clone());
            }
        }
        GenerationError::Transport { cause, .. } => {
            debug_info.cause = cause.clone();
        }
        GenerationError::SchemaMismatch { .. } | GenerationError::UnexpectedResponse { .. } => {}
    }

    FailureBody {
        error: PROCESSING_ERROR.to_string(),
        details: format!("An error occurred: {}", e),
        debug_info,
    }
}
