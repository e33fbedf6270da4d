//! Structured-generation port. The analyzer talks to the hosted model only
//! through [`StructuredGenerator`], so tests can swap in a canned answer.

use async_trait::async_trait;
use serde_json::Value;

/// Everything one structured-generation call needs.
#[derive(Debug)]
pub struct GenerationRequest<'a> {
    pub api_key: &'a str,
    pub model: &'a str,
    pub prompt: &'a str,
    pub schema: &'a Value,
    pub temperature: f32,
}

/// Closed set of failures the generation path can produce. Each variant
/// carries only the diagnostics that exist for it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("model output is not valid JSON: {message}")]
    JsonParse { message: String, text: String },
    #[error("model output does not match the schema: {message}")]
    SchemaMismatch { message: String, text: String },
    #[error("generation service returned {status}")]
    Upstream { status: u16, body: String },
    #[error("{message}")]
    Transport {
        message: String,
        cause: Option<String>,
    },
    #[error("{message}")]
    UnexpectedResponse { message: String },
}

impl GenerationError {
    /// Stable identifier used in diagnostic payloads and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::JsonParse { .. } => "json_parse",
            GenerationError::SchemaMismatch { .. } => "schema_mismatch",
            GenerationError::Upstream { .. } => "upstream",
            GenerationError::Transport { .. } => "transport",
            GenerationError::UnexpectedResponse { .. } => "unexpected_response",
        }
    }

    /// Error name in the form API clients of the hosted service know.
    pub fn name(&self) -> &'static str {
        match self {
            GenerationError::JsonParse { .. } => "AI_JSONParseError",
            GenerationError::SchemaMismatch { .. } => "AI_TypeValidationError",
            GenerationError::Upstream { .. } => "AI_APICallError",
            GenerationError::Transport { .. } => "AI_RetryError",
            GenerationError::UnexpectedResponse { .. } => "AI_NoContentGeneratedError",
        }
    }

    /// Raw model text that failed parsing or validation, if any.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            GenerationError::JsonParse { text, .. }
            | GenerationError::SchemaMismatch { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &'static str;

    /// Runs one generation and returns the model's raw output text.
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, GenerationError>;
}
