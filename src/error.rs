use rustyline::error::ReadlineError;

/// Failures surfaced by [`crate::client::InferenceClient`].
///
/// Every call either yields generated text or exactly one of these kinds.
/// Nothing is retried inside the client; [`InferenceError::is_retryable`]
/// tells the caller whether asking again is worthwhile.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// Required configuration is missing or invalid. Raised before any request.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    /// The API key could not be exchanged for an access token.
    #[error("authentication failed{}: {reason}", fmt_status(*status))]
    AuthFailure { status: Option<u16>, reason: String },

    /// The generation request failed at the network or HTTP layer.
    #[error("request failed{}: {reason}", fmt_status(*status))]
    TransportFailure { status: Option<u16>, reason: String },

    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },
}

fn fmt_status(status: Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl InferenceError {
    pub fn config(reason: impl Into<String>) -> Self {
        InferenceError::Configuration {
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            InferenceError::AuthFailure { status, .. }
            | InferenceError::TransportFailure { status, .. } => *status,
            _ => None,
        }
    }

    /// Network errors, throttling and 5xx answers may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            InferenceError::TransportFailure { status: None, .. } => true,
            InferenceError::TransportFailure {
                status: Some(code), ..
            } => *code == 429 || *code >= 500,
            InferenceError::AuthFailure { status: None, .. } => true,
            _ => false,
        }
    }
}

/// Errors of the terminal front-end.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error("Error loading data: {0}")]
    Analytics(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Terminal error: {0}")]
    Terminal(#[from] clearscreen::Error),
    #[error("Readline error: {0}")]
    Readline(String),
}

impl From<ReadlineError> for AppError {
    fn from(err: ReadlineError) -> Self {
        AppError::Readline(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
