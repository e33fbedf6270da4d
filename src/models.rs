use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Annual GMV buckets the model must pick from, smallest first.
pub const GMV_RANGES: [&str; 8] = [
    "< $500K",
    "$500K - $1M",
    "$1M - $5M",
    "$5M - $10M",
    "$10M - $25M",
    "$25M - $50M",
    "$50M - $100M",
    "$100M+",
];

pub const GMV_NOT_APPLICABLE: &str = "N/A";
pub const VERTICAL_MAX_CHARS: usize = 100;

#[derive(Debug)]
pub struct AnalyzeParams {
    pub domain: Option<String>,
}

impl AnalyzeParams {
    /// Builds params from raw query pairs. A repeated `domain` keeps its
    /// first value.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let domain = pairs
            .into_iter()
            .find(|(key, _)| key == "domain")
            .map(|(_, value)| value);
        Self { domain }
    }
}

/// Keys outside the six fields are dropped on deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub url: String,
    pub vertical: String,
    pub gmv: String,
    pub products: String,
    pub desc: String,
    pub country: String,
}

impl AnalysisResult {
    /// Checks the constraints the output schema declares. The remote service
    /// is asked to honour the schema but its answer is re-checked here.
    pub fn check_constraints(&self) -> Result<(), String> {
        let vertical_len = self.vertical.chars().count();
        if vertical_len > VERTICAL_MAX_CHARS {
            return Err(format!(
                "vertical must be at most {} characters, got {}",
                VERTICAL_MAX_CHARS, vertical_len
            ));
        }
        if self.gmv != GMV_NOT_APPLICABLE && !GMV_RANGES.contains(&self.gmv.as_str()) {
            return Err(format!("gmv '{}' is not one of the predefined ranges", self.gmv));
        }
        // "XX" is itself two uppercase letters, so one check covers both.
        let country_ok =
            self.country.len() == 2 && self.country.bytes().all(|b| b.is_ascii_uppercase());
        if !country_ok {
            return Err(format!(
                "country '{}' must be two uppercase letters (ISO 3166-1 alpha-2)",
                self.country
            ));
        }
        Ok(())
    }
}

/// JSON Schema handed to the generation service as the structured output
/// contract for [`AnalysisResult`].
pub fn analysis_schema() -> Value {
    let mut gmv_values: Vec<&str> = GMV_RANGES.to_vec();
    gmv_values.push(GMV_NOT_APPLICABLE);

    json!({
        "type": "object",
        "properties": {
            "url": {
                "type": "string",
                "description": "The full URL that was analyzed (e.g., https://example.com). Must be a valid, complete URL string."
            },
            "vertical": {
                "type": "string",
                "maxLength": VERTICAL_MAX_CHARS,
                "description": "The primary business vertical of the website, concisely described (e.g., 'E-commerce Fashion Retail', 'SaaS Project Management'). 2-4 words."
            },
            "gmv": {
                "type": "string",
                "enum": gmv_values,
                "description": "The single annual Gross Merchandise Value range that best fits the business, or 'N/A' when GMV does not apply."
            },
            "products": {
                "type": "string",
                "description": "Summary of the main products or services, with typical price points, pricing tiers or pricing strategy when observable."
            },
            "desc": {
                "type": "string",
                "description": "A short description (1-3 sentences) of the core business, value proposition and target audience."
            },
            "country": {
                "type": "string",
                "pattern": "^[A-Z]{2}$",
                "description": "ISO 3166-1 alpha-2 code of the country where the company is primarily based (e.g., 'US', 'GB', 'DE'), or 'XX' when unclear or truly global."
            }
        },
        "required": ["url", "vertical", "gmv", "products", "desc", "country"],
        "additionalProperties": false
    })
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct FailureBody {
    pub error: String,
    pub details: String,
    #[serde(rename = "debugInfo")]
    pub debug_info: DebugInfo,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub raw_error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_output_attempt: Option<String>,
}
