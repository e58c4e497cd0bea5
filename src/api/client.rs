use super::logging::{debug_payload_enabled, emit_debug_payload};
use crate::config::Config;
use crate::types::{ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse};
use crate::util::is_local_endpoint_url;
use anyhow::anyhow;
use anyhow::Result;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::StatusCode;
use std::pin::Pin;
#[cfg(test)]
use std::sync::Arc;
use thiserror::Error;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

const ANALYSIS_PROMPT: &str = "Analyze this code for accessibility, performance, and best practices. Return a brief summary.";

/// Error reported by the generation service itself, carrying its message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ServiceError {
    pub status: Option<u16>,
    pub message: String,
}

#[cfg(test)]
pub trait MockStreamProducer: Send + Sync {
    fn create_mock_stream(&self, request: &GenerateContentRequest) -> Result<ByteStream>;

    fn create_mock_response(
        &self,
        _request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        Err(anyhow!("mock producer has no unary response configured"))
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_url: String,
    temperature: f32,
    #[cfg(test)]
    mock_stream_producer: Option<Arc<dyn MockStreamProducer>>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            #[cfg(test)]
            mock_stream_producer: None,
        })
    }

    #[cfg(test)]
    pub fn new_mock(mock_producer: Arc<dyn MockStreamProducer>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: None,
            model: "mock-model".to_string(),
            api_url: "http://localhost:8000/v1beta".to_string(),
            temperature: crate::config::DEFAULT_TEMPERATURE,
            mock_stream_producer: Some(mock_producer),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn is_local_endpoint(&self) -> bool {
        is_local_endpoint_url(&self.api_url)
    }

    /// Builds the request body for one prompt under a system instruction.
    pub fn build_request(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
    ) -> GenerateContentRequest {
        GenerateContentRequest::single_turn(prompt, system_instruction, self.temperature)
    }

    /// Opens a streaming completion and returns the raw SSE byte stream.
    pub async fn create_stream(&self, request: &GenerateContentRequest) -> Result<ByteStream> {
        #[cfg(test)]
        {
            if let Some(producer) = &self.mock_stream_producer {
                return producer.create_mock_stream(request);
            }
        }

        let request_url = self.request_url("streamGenerateContent", true);
        let response = self.send(&request_url, request).await?;

        let request_url_for_stream = request_url.clone();
        let stream = response.bytes_stream().map(move |item| {
            item.map_err(|error| map_api_request_error(error, &request_url_for_stream))
        });
        Ok(Box::pin(stream))
    }

    /// Issues a non-streaming completion and returns the full reply.
    pub async fn generate(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        #[cfg(test)]
        {
            if let Some(producer) = &self.mock_stream_producer {
                return producer.create_mock_response(request);
            }
        }

        let request_url = self.request_url("generateContent", false);
        let response = self.send(&request_url, request).await?;
        let body = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|error| map_api_request_error(error, &request_url))?;
        if let Some(error) = body.error {
            return Err(ServiceError {
                status: error.code,
                message: error.message,
            }
            .into());
        }
        Ok(body)
    }

    /// Asks the model for a short review of `code`.
    pub async fn analyze_code(&self, code: &str) -> Result<String> {
        let prompt = format!("{ANALYSIS_PROMPT} \n\n {code}");
        let request = self.build_request(&prompt, None);
        let response = self.generate(&request).await?;
        let text = response.text();
        if text.trim().is_empty() {
            Ok("No analysis generated.".to_string())
        } else {
            Ok(text)
        }
    }

    async fn send(
        &self,
        request_url: &str,
        request: &GenerateContentRequest,
    ) -> Result<reqwest::Response> {
        if debug_payload_enabled() {
            match serde_json::to_value(request) {
                Ok(payload) => emit_debug_payload(request_url, &payload),
                Err(error) => log::warn!("payload serialization for debug log failed: {error}"),
            }
        }

        let mut builder = self
            .http
            .post(request_url)
            .header("content-type", "application/json")
            .json(request);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("x-goog-api-key", api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|error| map_api_request_error(error, request_url))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(service_error_from_body(status, &body).into())
    }

    fn request_url(&self, method: &str, sse: bool) -> String {
        let base = format!("{}/models/{}:{method}", self.api_url, self.model);
        if sse {
            format!("{base}?alt=sse")
        } else {
            base
        }
    }
}

fn service_error_from_body(status: StatusCode, body: &str) -> ServiceError {
    let message = serde_json::from_str::<ApiErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("generation service returned HTTP {status}")
            } else {
                format!("generation service returned HTTP {status}: {trimmed}")
            }
        });
    ServiceError {
        status: Some(status.as_u16()),
        message,
    }
}

fn map_api_request_error(error: reqwest::Error, request_url: &str) -> anyhow::Error {
    if error.is_connect() && is_local_endpoint_url(request_url) {
        return anyhow!(
            "cannot reach local API endpoint '{}': {}. Start your local server or update GEMINI_API_URL.",
            request_url,
            error
        );
    }
    if error.is_connect() {
        return anyhow!("cannot reach API endpoint '{}': {}", request_url, error);
    }
    if error.is_timeout() {
        return anyhow!("API request to '{}' timed out: {}", request_url, error);
    }
    if error.is_decode() {
        return anyhow!("API response from '{}' was malformed: {}", request_url, error);
    }
    anyhow!("API request to '{}' failed: {}", request_url, error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_url: &str) -> Config {
        Config {
            api_key: Some("test-key".to_string()),
            api_url: api_url.to_string(),
            model: "gemini-test".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_stream_url_targets_sse_endpoint() {
        let client = ApiClient::new(&config("https://example.test/v1beta/")).expect("client");
        assert_eq!(
            client.request_url("streamGenerateContent", true),
            "https://example.test/v1beta/models/gemini-test:streamGenerateContent?alt=sse"
        );
        assert_eq!(
            client.request_url("generateContent", false),
            "https://example.test/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn test_build_request_uses_configured_temperature() {
        let mut cfg = config("https://example.test/v1beta");
        cfg.temperature = 0.1;
        let client = ApiClient::new(&cfg).expect("client");
        let request = client.build_request("hi", Some("rules"));
        assert_eq!(request.generation_config.temperature, Some(0.1));
        assert!(request.system_instruction.is_some());
    }

    #[test]
    fn test_service_error_prefers_service_message() {
        let error = service_error_from_body(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#,
        );
        assert_eq!(error.status, Some(400));
        assert_eq!(
            error.message,
            "API key not valid. Please pass a valid API key."
        );
    }

    #[test]
    fn test_service_error_falls_back_to_status_and_body() {
        let error = service_error_from_body(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(error.message.contains("502"));
        assert!(error.message.contains("upstream down"));

        let empty = service_error_from_body(StatusCode::SERVICE_UNAVAILABLE, "");
        assert!(empty.message.contains("503"));
    }

    #[test]
    fn test_local_endpoint_detection() {
        let client = ApiClient::new(&config("http://localhost:8080/v1beta")).expect("client");
        assert!(client.is_local_endpoint());
    }
}
