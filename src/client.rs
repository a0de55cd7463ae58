use crate::config::Config;
use crate::error::InferenceError;
use crate::models::{api_error_message, GenerationRequest, GenerationResponse, TokenResponse, APIKEY_GRANT_TYPE};
use crate::token::{AccessToken, TokenCache};
use crate::transport::{HttpTransport, ReqwestTransport, TransportError};

/// Client for a hosted text-generation deployment.
///
/// Exchanges the configured API key for a bearer token on first use, keeps the
/// token until shortly before it expires, and sends greedy generation requests.
/// Failures are never retried here; see [`InferenceError::is_retryable`].
pub struct InferenceClient<T = ReqwestTransport> {
    transport: T,
    config: Config,
    token: TokenCache,
}

impl InferenceClient<ReqwestTransport> {
    pub fn new(config: Config) -> Result<Self, InferenceError> {
        let transport = ReqwestTransport::new(config.request_timeout)
            .map_err(|e| InferenceError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: HttpTransport> InferenceClient<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        Self {
            transport,
            config,
            token: TokenCache::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends `prompt` and returns `results[0].generated_text` verbatim. An empty
    /// `generated_text` is reported as [`InferenceError::MalformedResponse`].
    pub async fn generate(&self, prompt: &str) -> Result<String, InferenceError> {
        let token = self.access_token().await?;

        let request = GenerationRequest::greedy(prompt, self.config.max_new_tokens);
        let url = self.config.generate_url();

        tracing::info!(
            url = %url,
            prompt_chars = prompt.chars().count(),
            max_new_tokens = request.parameters.max_new_tokens.get(),
            "sending generation request"
        );

        let response = self
            .transport
            .post_generation(&url, &token, &request)
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, timed_out = e.timed_out, error = %e, "generation request failed");
                InferenceError::TransportFailure {
                    status: None,
                    reason: self.describe_transport_error(e),
                }
            })?;

        if !response.is_success() {
            tracing::warn!(status = response.status, "generation endpoint returned an error");
            if response.status == 401 {
                self.token.invalidate_if_current(&token).await;
            }
            return Err(InferenceError::TransportFailure {
                status: Some(response.status),
                reason: api_error_message(&response.body),
            });
        }

        extract_generated_text(&response.body)
    }

    pub async fn treatment_plan(&self, diagnosis: &str) -> Result<String, InferenceError> {
        self.generate(&treatment_plan_prompt(diagnosis)).await
    }

    /// Drops the cached token; the next call performs a fresh exchange.
    pub async fn invalidate_token(&self) {
        self.token.invalidate().await;
    }

    pub async fn has_valid_token(&self) -> bool {
        self.token.has_usable_token().await
    }

    async fn access_token(&self) -> Result<String, InferenceError> {
        self.token.get_or_refresh(|| self.exchange_api_key()).await
    }

    async fn exchange_api_key(&self) -> Result<AccessToken, InferenceError> {
        let url = &self.config.iam_token_url;
        tracing::debug!(url = %url, "exchanging API key for access token");

        let form = [
            ("apikey", self.config.credentials.api_key()),
            ("grant_type", APIKEY_GRANT_TYPE),
        ];

        let response = self.transport.post_form(url, &form).await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "token exchange failed");
            InferenceError::AuthFailure {
                status: None,
                reason: self.describe_transport_error(e),
            }
        })?;

        if !response.is_success() {
            tracing::warn!(status = response.status, "token exchange rejected");
            return Err(InferenceError::AuthFailure {
                status: Some(response.status),
                reason: api_error_message(&response.body),
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&response.body).map_err(|e| InferenceError::AuthFailure {
                status: Some(response.status),
                reason: format!("token response is not valid JSON: {e}"),
            })?;

        let value = parsed
            .access_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| InferenceError::AuthFailure {
                status: Some(response.status),
                reason: "token response has no access_token".to_string(),
            })?;

        let expires_in = parsed.expires_in_secs();
        tracing::info!(expires_in = ?expires_in, "obtained access token");
        Ok(AccessToken::from_expires_in(value, expires_in))
    }

    fn describe_transport_error(&self, err: TransportError) -> String {
        if err.timed_out {
            format!(
                "timed out after {}s: {}",
                self.config.request_timeout.as_secs(),
                err.reason
            )
        } else {
            err.reason
        }
    }
}

pub fn treatment_plan_prompt(diagnosis: &str) -> String {
    format!("Suggest a simple and safe treatment plan for {}.", diagnosis.trim())
}

fn extract_generated_text(body: &str) -> Result<String, InferenceError> {
    let parsed: GenerationResponse =
        serde_json::from_str(body).map_err(|e| InferenceError::MalformedResponse {
            reason: format!("expected results[0].generated_text: {e}"),
        })?;

    let first = parsed
        .results
        .into_iter()
        .next()
        .ok_or_else(|| InferenceError::MalformedResponse {
            reason: "results is empty".to_string(),
        })?;

    if first.generated_text.is_empty() {
        return Err(InferenceError::MalformedResponse {
            reason: "generated_text is empty".to_string(),
        });
    }

    tracing::debug!(
        generated_tokens = ?first.generated_token_count,
        stop_reason = ?first.stop_reason,
        "generation complete"
    );
    Ok(first.generated_text)
}
