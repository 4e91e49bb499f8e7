//! Gemini `generateContent` client.
//!
//! A deliberately thin HTTP wrapper: one request, one answer string. No
//! retries or rate limiting; failure handling belongs to the caller,
//! which maps errors to a user-facing fallback message.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use tenderlens_shared::{GeminiConfig, GenerationConfig, Result, TenderLensError};

// ---------------------------------------------------------------------------
// Request / response types (Gemini REST schema)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: RequestGenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Concatenated text of the first candidate, if any.
fn extract_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Generation parameters
// ---------------------------------------------------------------------------

/// Tuning knobs forwarded with every generation request.
///
/// Note the asymmetry: output length is capped, input length is not. The
/// model's own context ceiling is the only guard on prompt size.
#[derive(Debug, Clone, Copy)]
pub struct GenerationParams {
    /// Sampling temperature in `[0, 1]`.
    pub temperature: f32,
    /// Cap on generated tokens.
    pub max_output_tokens: u32,
}

impl From<&GenerationConfig> for GenerationParams {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Build a client from explicit parts.
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TenderLensError::config(format!("invalid Gemini base URL: {e}")))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("tenderlens/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TenderLensError::Llm(format!("client build: {e}")))?;

        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Build a client from config, reading the API key from its env var.
    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            TenderLensError::config(format!(
                "Gemini API key not found. Set the {} environment variable.",
                config.api_key_env
            ))
        })?;
        Self::new(&config.base_url, api_key, config.model.clone())
    }

    /// Model identifier this client generates with.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model one question and return its answer text.
    ///
    /// The system prompt is folded into the user prompt, for models
    /// without separate system-instruction support. An empty generation
    /// is reported as an error.
    #[instrument(skip_all, fields(model = %self.model, prompt_len = user_prompt.len()))]
    pub async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: GenerationParams,
    ) -> Result<String> {
        let combined = format!("{system_prompt}\n\n{user_prompt}");

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: combined }],
            }],
            generation_config: RequestGenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_output_tokens,
            },
        };

        let endpoint = format!(
            "{}/models/{}:generateContent",
            self.base_url.as_str().trim_end_matches('/'),
            self.model
        );

        let response = self
            .http
            .post(&endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| TenderLensError::Llm(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail: String = body.chars().take(200).collect();
            return Err(TenderLensError::Llm(format!("HTTP {status}: {detail}")));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| TenderLensError::Llm(format!("invalid response body: {e}")))?;

        let text = extract_text(&parsed);
        if text.trim().is_empty() {
            return Err(TenderLensError::Llm("empty response from model".into()));
        }

        tracing::info!(answer_len = text.len(), "generation complete");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "question".into(),
                }],
            }],
            generation_config: RequestGenerationConfig {
                temperature: 0.7,
                max_output_tokens: 50_000,
            },
        };
        let json = serde_json::to_string(&request).expect("serialize");
        assert!(json.contains(r#""generationConfig""#));
        assert!(json.contains(r#""maxOutputTokens":50000"#));
        assert!(json.contains(r#""text":"question""#));
    }

    #[test]
    fn response_text_is_extracted() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "The EMD "}, {"text": "is one lakh."}]}}
            ]
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(extract_text(&parsed), "The EMD is one lakh.");
    }

    #[test]
    fn empty_candidates_extract_nothing() {
        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": []}"#).expect("parse");
        assert_eq!(extract_text(&parsed), "");

        let parsed: GenerateContentResponse = serde_json::from_str(r#"{}"#).expect("parse");
        assert_eq!(extract_text(&parsed), "");
    }

    #[test]
    fn blocked_candidate_without_content_extracts_nothing() {
        let json = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(extract_text(&parsed), "");
    }

    #[test]
    fn params_from_generation_config() {
        let config = GenerationConfig::default();
        let params = GenerationParams::from(&config);
        assert!((params.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(params.max_output_tokens, 50_000);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = GeminiClient::new("not a url", "key", "gemini-2.0-flash");
        assert!(result.is_err());
    }
}
