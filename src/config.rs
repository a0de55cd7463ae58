use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::error::InferenceError;
use crate::models::{Credentials, DEFAULT_MAX_NEW_TOKENS};

pub const DEFAULT_IAM_TOKEN_URL: &str = "https://iam.cloud.ibm.com/identity/token";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_ANALYTICS_CSV: &str = "data/patient_data.csv";

const GENERATE_PATH: &str = "/v2/text/generate";

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    /// Base URL of the model deployment, without a trailing slash.
    pub deployment_url: String,
    pub iam_token_url: String,
    pub request_timeout: Duration,
    pub max_new_tokens: NonZeroU32,
    pub analytics_csv: PathBuf,
}

impl Config {
    pub fn new(api_key: impl Into<String>, deployment_url: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(api_key),
            deployment_url: normalize_base_url(&deployment_url.into()),
            iam_token_url: DEFAULT_IAM_TOKEN_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            analytics_csv: PathBuf::from(DEFAULT_ANALYTICS_CSV),
        }
    }

    pub fn from_env() -> Result<Self, InferenceError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads every setting through `lookup`. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, InferenceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("API_KEY")
            .or_else(|| get("IBM_API_KEY"))
            .ok_or_else(|| InferenceError::config("API_KEY is not set"))?;
        let deployment_url =
            get("DEPLOYMENT_URL").ok_or_else(|| InferenceError::config("DEPLOYMENT_URL is not set"))?;

        let mut config = Self::new(api_key, deployment_url);
        validate_url("DEPLOYMENT_URL", &config.deployment_url)?;

        if let Some(url) = get("IAM_TOKEN_URL") {
            validate_url("IAM_TOKEN_URL", &url)?;
            config.iam_token_url = url;
        }

        if let Some(raw) = get("REQUEST_TIMEOUT_SECS") {
            let secs = parse_positive("REQUEST_TIMEOUT_SECS", &raw)?;
            config.request_timeout = Duration::from_secs(u64::from(secs.get()));
        }

        if let Some(raw) = get("MAX_NEW_TOKENS") {
            config.max_new_tokens = parse_positive("MAX_NEW_TOKENS", &raw)?;
        }

        if let Some(path) = get("ANALYTICS_CSV") {
            config.analytics_csv = PathBuf::from(path);
        }

        Ok(config)
    }

    pub fn generate_url(&self) -> String {
        format!("{}{}", self.deployment_url, GENERATE_PATH)
    }
}

fn validate_url(key: &str, value: &str) -> Result<(), InferenceError> {
    let url = Url::parse(value)
        .map_err(|e| InferenceError::config(format!("{key} is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(InferenceError::config(format!(
            "{key} must use http or https, got '{other}'"
        ))),
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_positive(key: &str, raw: &str) -> Result<NonZeroU32, InferenceError> {
    raw.parse::<NonZeroU32>().map_err(|_| {
        InferenceError::config(format!("{key} must be a positive integer, got '{raw}'"))
    })
}
