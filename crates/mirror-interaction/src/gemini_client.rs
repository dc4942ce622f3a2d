//! GeminiCalibrationClient - Direct REST API client for Gemini.
//!
//! Sends one `generateContent` request per calibration and returns the
//! text of the first candidate. The API key is looked up on every call, so
//! a missing key surfaces as a configuration error before any request.

use async_trait::async_trait;
use mirror_core::calibration::CalibrationClient;
use mirror_core::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use mirror_core::error::{BackendErrorKind, MirrorError, Result};
use mirror_core::secret::SecretService;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const API_KEY_HEADER: &str = "x-goog-api-key";
const JSON_MIME_TYPE: &str = "application/json";

/// Calibration client that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiCalibrationClient {
    client: Client,
    secrets: Arc<dyn SecretService>,
    model: String,
    base_url: String,
    system_instruction: Option<String>,
}

impl GeminiCalibrationClient {
    /// Creates a client for the default model and endpoint.
    pub fn new(secrets: Arc<dyn SecretService>) -> Self {
        Self {
            client: Client::new(),
            secrets,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            system_instruction: None,
        }
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the endpoint prefix (`…/v1beta/models`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Adds a system instruction that will be sent alongside every request.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(&self, input_text: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: crate::prompt::user_prompt(input_text),
                }],
            }],
            system_instruction: self.system_instruction.as_ref().map(|text| Content {
                role: None,
                parts: vec![Part { text: text.clone() }],
            }),
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME_TYPE.to_string(),
            },
        }
    }

    async fn send_request(&self, api_key: &str, body: &GenerateContentRequest) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| {
                MirrorError::network(format!("Gemini API request failed: {}", err.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            MirrorError::backend(
                BackendErrorKind::Unknown,
                format!("Failed to parse Gemini response: {}", err.without_url()),
            )
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl CalibrationClient for GeminiCalibrationClient {
    async fn submit(&self, input_text: &str) -> Result<String> {
        let api_key = self.secrets.api_key().await?;

        tracing::debug!(model = %self.model, "Sending calibration request");
        let request = self.build_request(input_text);
        let text = self.send_request(&api_key, &request).await?;
        tracing::debug!(bytes = text.len(), "Received calibration response");

        Ok(text)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    let text: String = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(MirrorError::backend(
            BackendErrorKind::Unknown,
            "Gemini API returned no text in the response candidates",
        ));
    }

    Ok(text)
}

fn map_http_error(status: StatusCode, body: &str) -> MirrorError {
    let (status_text, message) = serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            (
                wrapper.error.status.unwrap_or_default(),
                wrapper.error.message.unwrap_or_else(|| body.to_string()),
            )
        })
        .unwrap_or_else(|_| (String::new(), body.to_string()));

    let rejected_key = status == StatusCode::BAD_REQUEST && message.contains("API key");
    let kind = if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) || rejected_key {
        BackendErrorKind::Auth
    } else {
        BackendErrorKind::Unknown
    };

    let message = if status_text.is_empty() {
        format!("HTTP {}: {message}", status.as_u16())
    } else {
        format!("HTTP {} {status_text}: {message}", status.as_u16())
    };

    MirrorError::backend(kind, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MissingKey;

    #[async_trait]
    impl SecretService for MissingKey {
        async fn api_key(&self) -> Result<String> {
            Err(MirrorError::config("VITE_GEMINI_API_KEY is not set"))
        }
    }

    fn client() -> GeminiCalibrationClient {
        GeminiCalibrationClient::new(Arc::new(MissingKey))
            .with_model("gemini-test")
            .with_base_url("http://127.0.0.1:9/v1beta/models/")
            .with_system_instruction("be brief")
    }

    #[test]
    fn test_request_shape() {
        let request = client().build_request("焦虑");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert!(json["contents"][0]["parts"][0]["text"].as_str().unwrap().contains("焦虑"));
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be brief");
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            client().endpoint(),
            "http://127.0.0.1:9/v1beta/models/gemini-test:generateContent"
        );
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let err = client().submit("text").await.unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text_response(response).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_extract_text_empty_is_unknown_error() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        let err = extract_text_response(response).unwrap_err();
        assert_eq!(err.backend_kind(), Some(BackendErrorKind::Unknown));
    }

    #[test]
    fn test_map_http_error_classifies_auth() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        let err = map_http_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.backend_kind(), Some(BackendErrorKind::Auth));
        assert!(err.to_string().contains("INVALID_ARGUMENT"));

        let err = map_http_error(StatusCode::FORBIDDEN, "denied");
        assert_eq!(err.backend_kind(), Some(BackendErrorKind::Auth));
    }

    #[test]
    fn test_map_http_error_other_is_unknown() {
        let err = map_http_error(StatusCode::SERVICE_UNAVAILABLE, "overloaded");
        assert_eq!(err.backend_kind(), Some(BackendErrorKind::Unknown));
        assert!(err.to_string().contains("503"));
    }
}
