//! Google Gemini `generateContent` provider.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::GeminiConfig;
use crate::error::LlmError;
use crate::llm::provider::{CompletionRequest, CompletionResponse, LlmProvider, error_for_status};

const PROVIDER: &str = "gemini";

pub struct GeminiProvider {
    api_key: SecretString,
    model: String,
    api_base: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: &GeminiConfig, client: reqwest::Client) -> Self {
        Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Endpoint without the key; the key travels as a query parameter.
    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut generation_config = serde_json::Map::new();
        if let Some(t) = request.temperature {
            generation_config.insert("temperature".into(), serde_json::json!(t));
        }
        if let Some(n) = request.max_tokens {
            generation_config.insert("maxOutputTokens".into(), serde_json::json!(n));
        }
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": request.prompt }] }],
            "generationConfig": generation_config,
        });

        let resp = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.into(),
                // The URL carries the API key.
                reason: e.without_url().to_string(),
            })?;

        if !resp.status().is_success() {
            return Err(error_for_status(PROVIDER, resp).await);
        }

        let data: GenerateResponse = resp.json().await.map_err(|e| LlmError::InvalidResponse {
            provider: PROVIDER.into(),
            reason: e.to_string(),
        })?;

        let content = data
            .into_text()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LlmError::EmptyResponse {
                provider: PROVIDER.into(),
            })?;

        Ok(CompletionResponse { content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base: &str) -> GeminiProvider {
        let config = GeminiConfig {
            api_key: SecretString::from("g-key"),
            model: "gemini-1.5-flash".into(),
            api_base: base.into(),
            max_attempts: 1,
        };
        GeminiProvider::new(&config, reqwest::Client::new())
    }

    #[test]
    fn endpoint_includes_model() {
        let p = provider("https://generativelanguage.googleapis.com/");
        assert_eq!(
            p.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(p.name(), "gemini");
        assert_eq!(p.model_name(), "gemini-1.5-flash");
    }

    #[test]
    fn response_text_is_first_part_of_first_candidate() {
        let raw = r#"{"candidates": [{"content": {"parts": [{"text": "{\"title\": \"x\"}"}, {"text": "ignored"}]}}]}"#;
        let data: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(data.into_text().as_deref(), Some(r#"{"title": "x"}"#));
    }

    #[test]
    fn blocked_response_has_no_text() {
        let raw = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let data: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert!(data.into_text().is_none());

        let raw = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let data: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert!(data.into_text().is_none());
    }
}
