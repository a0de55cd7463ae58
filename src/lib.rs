pub mod analytics;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod prediction;
pub mod renderer;
pub mod token;
pub mod transport;
pub mod ui;

pub use client::InferenceClient;
pub use config::Config;
pub use error::{AppError, InferenceError};
pub use models::{Credentials, DecodingMethod, GenerationRequest};
pub use token::{AccessToken, TokenCache};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};
