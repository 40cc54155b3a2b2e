// content-analyzer-rs/src/model_client.rs
//
// HTTP client for the hosted Claude model endpoint (Bedrock runtime invoke contract)
//
// This module provides:
// - Real HTTP calls to the model endpoint via reqwest
// - Proper error handling with classification of failure modes
// - Configuration via environment variables
//
// Configuration (.env file):
// - MODEL_API_URL: Full endpoint URL override (defaults to the Bedrock runtime
//   invoke URL built from AWS_REGION and the fixed model id)
// - AWS_REGION: Region used for the default endpoint URL (default: "us-east-1")
// - MODEL_API_KEY: Bearer credential for the endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Model identifier used in the invoke path.
pub const MODEL_ID: &str = "anthropic.claude-3-haiku-20240307-v1:0";

/// Short model label reported in response metadata.
pub const MODEL_LABEL: &str = "claude-3-haiku";

/// Version tag the messages endpoint expects in the request body.
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Fixed output-token budget for every analysis request.
pub const MAX_OUTPUT_TOKENS: u32 = 2000;

const DEFAULT_REGION: &str = "us-east-1";
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct InvokeRequest {
    anthropic_version: &'static str,
    max_tokens: u32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct InvokeResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: String,
}

// Custom error type for model client operations
#[derive(Debug)]
pub enum ModelError {
    InvalidRequest(String),    // 400, 401, 403, 404 - Client-side errors
    RateLimitExceeded(String), // 429 - Rate limit errors
    ServerError(String),       // 500, 502, 503, 504 - Provider-side errors
    NetworkError(String),      // Connection issues, timeouts, network failures
    ParseError(String),        // Malformed provider reply
    UnknownError(String),      // Any other unclassified errors
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ModelError::RateLimitExceeded(msg) => write!(f, "Rate limit exceeded: {}", msg),
            ModelError::ServerError(msg) => write!(f, "Server error: {}", msg),
            ModelError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ModelError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ModelError::UnknownError(msg) => write!(f, "Unknown error: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

/// Invocation seam for the model endpoint. The handler depends on this trait
/// so tests can substitute a double without touching the analysis logic.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Send a prompt to the model and return the completion text.
    async fn invoke(&self, prompt: &str) -> Result<String, ModelError>;

    /// Whether the client holds the credentials it needs to make calls.
    fn is_configured(&self) -> bool {
        true
    }
}

#[derive(Debug)]
pub struct ModelClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl ModelClient {
    /// Creates a new ModelClient with configuration from environment variables.
    ///
    /// The reqwest client is built once here and reused for every invocation;
    /// the service constructs a single ModelClient at startup and shares it.
    pub fn new() -> Self {
        let api_url = env::var("MODEL_API_URL").unwrap_or_else(|_| {
            let region = env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string());
            format!(
                "https://bedrock-runtime.{}.amazonaws.com/model/{}/invoke",
                region, MODEL_ID
            )
        });

        let api_key = env::var("MODEL_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            log::warn!("MODEL_API_KEY is not set; model invocations will fail");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        log::info!("Model client initialized for {} ({})", MODEL_ID, api_url);

        Self {
            client,
            api_url,
            api_key,
        }
    }
}

impl Default for ModelClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelInvoker for ModelClient {
    async fn invoke(&self, prompt: &str) -> Result<String, ModelError> {
        if self.api_key.is_empty() {
            return Err(ModelError::InvalidRequest("API key is not set".to_string()));
        }

        let request_body = InvokeRequest {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: MAX_OUTPUT_TOKENS,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        log::info!(
            "Invoking model {} (prompt length={})",
            MODEL_ID,
            prompt.len()
        );

        let response = match self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&request_body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                // Categorize network errors
                if err.is_timeout() {
                    return Err(ModelError::NetworkError(format!(
                        "Request timed out: {}",
                        err
                    )));
                } else if err.is_connect() {
                    return Err(ModelError::NetworkError(format!(
                        "Connection failed: {}",
                        err
                    )));
                } else {
                    return Err(ModelError::NetworkError(format!("Network error: {}", err)));
                }
            }
        };

        // Handle HTTP status codes
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();

            return match status.as_u16() {
                400 => Err(ModelError::InvalidRequest(format!("Bad request: {}", text))),
                401 => Err(ModelError::InvalidRequest(format!("Unauthorized: {}", text))),
                403 => Err(ModelError::InvalidRequest(format!("Forbidden: {}", text))),
                404 => Err(ModelError::InvalidRequest(format!("Not found: {}", text))),
                429 => Err(ModelError::RateLimitExceeded(format!(
                    "Rate limit exceeded: {}",
                    text
                ))),
                500 | 502 | 503 | 504 => Err(ModelError::ServerError(format!(
                    "Server error ({}): {}",
                    status, text
                ))),
                _ => Err(ModelError::UnknownError(format!(
                    "Unknown error ({}): {}",
                    status, text
                ))),
            };
        }

        // Parse the successful response
        let data: InvokeResponse = response
            .json()
            .await
            .map_err(|err| ModelError::ParseError(format!("Failed to parse response: {}", err)))?;

        match data.content.first() {
            Some(block) => Ok(block.text.clone()),
            None => Err(ModelError::ParseError(
                "No content blocks returned in response".to_string(),
            )),
        }
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}
