use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_API_BASE: &str = "https://api.perplexity.ai";
const DEFAULT_MODEL: &str = "llama-3-sonar-large-32k-online";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is not a valid socket address: {value}")]
    BindAddr { name: &'static str, value: String },
    #[error("{name} is not a valid URL: {value}")]
    ApiBase { name: &'static str, value: String },
    #[error("{name} must be a positive number of seconds: {value}")]
    Timeout { name: &'static str, value: String },
}

/// Process settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    /// Kept optional: a missing key is reported per request, not at boot.
    pub api_key: Option<String>,
    pub api_base: Url,
    pub model: String,
    pub request_timeout: Option<Duration>,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::BindAddr {
            name: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let base_raw =
            lookup("PERPLEXITY_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let api_base = Url::parse(&base_raw).map_err(|_| ConfigError::ApiBase {
            name: "PERPLEXITY_API_BASE",
            value: base_raw.clone(),
        })?;

        let request_timeout = match lookup("PERPLEXITY_TIMEOUT_SECS") {
            None => None,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(ConfigError::Timeout {
                        name: "PERPLEXITY_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
        };

        Ok(Self {
            bind_addr,
            api_key: lookup("PERPLEXITY_API_KEY"),
            api_base,
            model: lookup("PERPLEXITY_MODEL")
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            request_timeout,
        })
    }
}
