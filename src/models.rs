use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

pub const DEFAULT_MAX_NEW_TOKENS: NonZeroU32 = match NonZeroU32::new(300) {
    Some(n) => n,
    None => unreachable!(),
};

pub const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Long-lived API key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodingMethod {
    Greedy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationParameters {
    pub decoding_method: DecodingMethod,
    pub max_new_tokens: NonZeroU32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub input: String,
    pub parameters: GenerationParameters,
}

impl GenerationRequest {
    pub fn greedy(prompt: impl Into<String>, max_new_tokens: NonZeroU32) -> Self {
        Self {
            input: prompt.into(),
            parameters: GenerationParameters {
                decoding_method: DecodingMethod::Greedy,
                max_new_tokens,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    pub results: Vec<GeneratedResult>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedResult {
    pub generated_text: String,
    #[serde(default)]
    pub generated_token_count: Option<u32>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<serde_json::Value>,
}

impl TokenResponse {
    /// `None` when absent or not a non-negative number.
    pub fn expires_in_secs(&self) -> Option<u64> {
        let value = self.expires_in.as_ref()?;
        value.as_u64().or_else(|| {
            value
                .as_f64()
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(|secs| secs as u64)
        })
    }
}

/// Error payloads of the IAM and watsonx endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, rename = "errorMessage")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Best human-readable message from a non-2xx body.
pub fn api_error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(msg) = parsed.error_message {
            return msg;
        }
        if let Some(detail) = parsed.errors.into_iter().next() {
            match (detail.code, detail.message) {
                (Some(code), Some(msg)) => return format!("{code}: {msg}"),
                (None, Some(msg)) => return msg,
                _ => {}
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }
    if trimmed.chars().count() > MAX_ERROR_BODY_CHARS {
        let head: String = trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{head}...")
    } else {
        trimmed.to_string()
    }
}
