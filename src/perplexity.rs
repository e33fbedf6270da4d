use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::generator::{GenerationError, GenerationRequest, StructuredGenerator};

const USER_AGENT: &str = "domain-intel-api/0.1";
const MAX_ERROR_BODY: usize = 2048;

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaSpec<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaSpec<'a> {
    schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────────────

/// Perplexity chat completions client with JSON-schema structured output.
#[derive(Debug, Clone)]
pub struct PerplexityClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl PerplexityClient {
    pub fn new(api_base: &Url, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::ClientBuilder::new()
            .connect_timeout(Duration::from_secs(5))
            .user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            endpoint: completions_endpoint(api_base),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// `Url::join` drops the last path segment unless the base ends in `/`.
fn completions_endpoint(api_base: &Url) -> Url {
    let mut base = api_base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("chat/completions").unwrap_or(base)
}

fn transport_error(e: reqwest::Error) -> GenerationError {
    let message = if e.is_timeout() {
        format!("TimeoutError: {}", e)
    } else if e.is_connect() {
        format!("ConnectError: {}", e)
    } else {
        format!("RequestError: {}", e)
    };
    GenerationError::Transport {
        message,
        cause: e.source().map(|s| s.to_string()),
    }
}

#[async_trait]
impl StructuredGenerator for PerplexityClient {
    fn name(&self) -> &'static str {
        "perplexity"
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: request.model,
            messages: [ChatMessage {
                role: "user",
                content: request.prompt,
            }],
            temperature: request.temperature,
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaSpec {
                    schema: request.schema,
                },
            },
        };

        tracing::debug!(endpoint = %self.endpoint, model = request.model, "sending completion request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(request.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let mut text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::debug!(status = %status, error = %e, "failed to read error body");
                    format!("error body unreadable: {}", e)
                }
            };
            if text.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| text.is_char_boundary(*i))
                    .unwrap_or(0);
                text.truncate(cut);
            }
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        let payload: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| GenerationError::UnexpectedResponse {
                    message: format!("completion response is not valid JSON: {}", e),
                })?;

        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GenerationError::UnexpectedResponse {
                message: "completion response missing choices[0].message.content".to_string(),
            })
    }
}
