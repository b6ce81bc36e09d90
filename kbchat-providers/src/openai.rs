//! OpenAI provider implementation
//!
//! Chat completions and embeddings. Also works against OpenAI-compatible
//! APIs through [`OpenAI::with_base_url`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{ChatRequest, Embeddings, Error, HttpConfig, Provider, Result};
use kbchat_core::message::validate_messages;

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default chat model
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// OpenAI API client
pub struct OpenAI {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    chat_model: String,
    embedding_model: String,
}

impl OpenAI {
    /// Create from API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create from environment variable
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| Error::ProviderAuth("OPENAI_API_KEY not set".to_string()))?;
        Self::new(api_key)
    }

    /// Create with custom base URL (for compatible APIs)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, base_url, &HttpConfig::default())
    }

    /// Create with custom base URL and HTTP settings
    pub fn with_config(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        config: &HttpConfig,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::ProviderAuth("API key is empty".to_string()));
        }

        Ok(Self {
            client: config.build_client()?,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
        })
    }

    /// Default chat model used when a request names none
    pub fn with_chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    /// Embedding model
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| Error::Internal(e.to_string()))?,
        );
        Ok(headers)
    }

    async fn post<B: Serialize + Sync, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, path))
            .headers(self.build_headers()?)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json::<R>().await?)
    }
}

/// Map a non-2xx response onto the provider error variants
async fn error_from_response(response: Response) -> Error {
    let status = response.status();
    let retry_after_secs = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .ok()
        .and_then(|body| body.error)
        .map(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or(text);

    tracing::warn!(status = %status, error = %message, "OpenAI request failed");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::ProviderAuth(format!("OpenAI rejected credentials ({status}): {message}"))
        }
        StatusCode::TOO_MANY_REQUESTS => Error::ProviderRateLimit { retry_after_secs },
        _ => Error::ProviderApi(format!("OpenAI API error {status}: {message}")),
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u64>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

#[async_trait]
impl Provider for OpenAI {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        validate_messages(&request.messages)?;

        let model = request.model.as_deref().unwrap_or(&self.chat_model);
        let body = CompletionRequest {
            model,
            messages: request
                .messages
                .iter()
                .map(|m| OpenAIMessage {
                    role: m.role.as_str(),
                    content: m.content.trim(),
                })
                .collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        tracing::debug!(model, messages = body.messages.len(), "Sending chat completion");
        let response: CompletionResponse = self.post("chat/completions", &body).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::ProviderApi("OpenAI response contained no message".to_string()))
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[async_trait]
impl Embeddings for OpenAI {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let body = EmbeddingRequest {
            model: &self.embedding_model,
            input: text,
        };
        let response: EmbeddingResponse = self.post("embeddings", &body).await?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| Error::embedding("OpenAI response contained no embedding"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_creation() {
        let provider = OpenAI::new("test-key").expect("client");
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(provider.chat_model, DEFAULT_CHAT_MODEL);
    }

    #[test]
    fn test_blank_key_is_rejected() {
        assert!(matches!(OpenAI::new("  "), Err(Error::ProviderAuth(_))));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let provider = OpenAI::with_base_url("k", "http://localhost:1234/v1/").expect("client");
        assert_eq!(provider.base_url, "http://localhost:1234/v1");
    }

    #[test]
    fn test_headers() {
        let provider = OpenAI::new("secret").expect("client");
        let headers = provider.build_headers().expect("headers");
        assert_eq!(headers[AUTHORIZATION], "Bearer secret");
    }
}
