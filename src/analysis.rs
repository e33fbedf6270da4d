use std::sync::Arc;

use serde_json::Value;

use crate::generator::{GenerationError, GenerationRequest, StructuredGenerator};
use crate::models::{analysis_schema, AnalysisResult};
use crate::prompt::build_prompt;

/// Sampling temperature; low to keep estimates conservative.
pub const TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Perplexity API key is missing or empty.")]
    Configuration,
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Runs one analysis per call against the configured generator.
pub struct Analyzer {
    api_key: Option<String>,
    model: String,
    schema: Value,
    generator: Arc<dyn StructuredGenerator>,
}

impl Analyzer {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        generator: Arc<dyn StructuredGenerator>,
    ) -> Self {
        Self {
            api_key,
            model: model.into(),
            schema: analysis_schema(),
            generator,
        }
    }

    pub async fn analyze(&self, url: &str, domain: &str) -> Result<AnalysisResult, AnalysisError> {
        let api_key = match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => {
                tracing::error!("PERPLEXITY_API_KEY is not set or is empty in the environment");
                return Err(AnalysisError::Configuration);
            }
        };

        let prompt = build_prompt(domain, url);
        let request = GenerationRequest {
            api_key,
            model: &self.model,
            prompt: &prompt,
            schema: &self.schema,
            temperature: TEMPERATURE,
        };

        tracing::info!(
            provider = self.generator.name(),
            model = %self.model,
            url,
            "requesting domain analysis"
        );
        let text = self.generator.generate(&request).await?;
        Ok(parse_analysis(&text)?)
    }
}

/// Parses raw model text into a checked [`AnalysisResult`]. A surrounding
/// markdown code fence is tolerated; anything else is reported with the raw
/// text attached.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult, GenerationError> {
    let value: Value =
        serde_json::from_str(strip_code_fence(text)).map_err(|e| GenerationError::JsonParse {
            message: e.to_string(),
            text: text.to_string(),
        })?;

    let result: AnalysisResult =
        serde_json::from_value(value).map_err(|e| GenerationError::SchemaMismatch {
            message: e.to_string(),
            text: text.to_string(),
        })?;

    result
        .check_constraints()
        .map_err(|message| GenerationError::SchemaMismatch {
            message,
            text: text.to_string(),
        })?;

    Ok(result)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    match inner.find('\n') {
        Some(idx) => inner[idx + 1..].trim(),
        None => inner.trim(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Generator double that replays a canned answer and records prompts.
    pub(crate) struct FakeGenerator {
        reply: Result<String, GenerationError>,
        pub(crate) calls: Mutex<Vec<(String, String, f32)>>,
    }

    impl FakeGenerator {
        pub(crate) fn replying(reply: Result<String, GenerationError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl StructuredGenerator for FakeGenerator {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn generate(
            &self,
            request: &GenerationRequest<'_>,
        ) -> Result<String, GenerationError> {
            self.calls.lock().unwrap().push((
                request.api_key.to_string(),
                request.prompt.to_string(),
                request.temperature,
            ));
            self.reply.clone()
        }
    }

    pub(crate) const EXAMPLE_REPLY: &str = r#"{"url":"https://example.com","vertical":"E-commerce Retail","gmv":"$1M - $5M","products":"...","desc":"...","country":"US"}"#;

    #[tokio::test]
    async fn blank_or_missing_key_never_calls_generator() {
        for key in [None, Some(String::new()), Some("  \t".to_string())] {
            let fake = FakeGenerator::replying(Ok(EXAMPLE_REPLY.to_string()));
            let analyzer = Analyzer::new(key, "sonar", fake.clone());
            let err = analyzer
                .analyze("https://example.com", "example.com")
                .await
                .unwrap_err();
            assert_eq!(err, AnalysisError::Configuration);
            assert_eq!(fake.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn success_makes_exactly_one_call() {
        let fake = FakeGenerator::replying(Ok(EXAMPLE_REPLY.to_string()));
        let analyzer = Analyzer::new(Some("pplx-test".to_string()), "sonar", fake.clone());

        let result = analyzer
            .analyze("https://example.com", "example.com")
            .await
            .unwrap();
        assert_eq!(result.url, "https://example.com");
        assert_eq!(result.gmv, "$1M - $5M");
        assert_eq!(result.country, "US");

        let calls = fake.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (key, prompt, temperature) = &calls[0];
        assert_eq!(key, "pplx-test");
        assert!(prompt.contains("https://example.com"));
        assert_eq!(*temperature, TEMPERATURE);
    }

    #[tokio::test]
    async fn generator_errors_pass_through() {
        let upstream = GenerationError::Upstream {
            status: 502,
            body: "bad gateway".to_string(),
        };
        let fake = FakeGenerator::replying(Err(upstream.clone()));
        let analyzer = Analyzer::new(Some("k".to_string()), "sonar", fake);
        let err = analyzer
            .analyze("https://example.com", "example.com")
            .await
            .unwrap_err();
        assert_eq!(err, AnalysisError::Generation(upstream));
    }

    #[test]
    fn non_json_output_is_json_parse_with_raw_text() {
        let err = parse_analysis("Sorry, I cannot browse.").unwrap_err();
        assert_eq!(err.kind(), "json_parse");
        assert_eq!(err.raw_output(), Some("Sorry, I cannot browse."));
    }

    #[test]
    fn wrong_shape_is_schema_mismatch() {
        let integer_gmv = r#"{"url":"https://example.com","vertical":"Retail","gmv":3000000,"products":"p","desc":"d","country":"US"}"#;
        let err = parse_analysis(integer_gmv).unwrap_err();
        assert_eq!(err.kind(), "schema_mismatch");
        assert_eq!(err.raw_output(), Some(integer_gmv));

        let missing_country = r#"{"url":"https://example.com","vertical":"Retail","gmv":"N/A","products":"p","desc":"d"}"#;
        assert_eq!(
            parse_analysis(missing_country).unwrap_err().kind(),
            "schema_mismatch"
        );

        let lower_country = EXAMPLE_REPLY.replace("\"US\"", "\"us\"");
        assert_eq!(
            parse_analysis(&lower_country).unwrap_err().raw_output(),
            Some(lower_country.as_str())
        );
    }

    #[test]
    fn code_fenced_output_is_accepted() {
        let fenced = format!("```json\n{}\n```", EXAMPLE_REPLY);
        let result = parse_analysis(&fenced).unwrap();
        assert_eq!(result.vertical, "E-commerce Retail");
    }
}
