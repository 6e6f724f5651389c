//! LLM integration for the rewrite step.
//!
//! Supports:
//! - **Gemini**: `generateContent` with the API key as a query parameter
//! - **OpenRouter**: OpenAI-compatible chat completions
//!
//! Each backend implements `LlmProvider`; `RewriteAdapter` layers the rewrite
//! prompt, JSON extraction and per-provider retries on top.

pub mod gemini;
pub mod openrouter;
pub mod prompt;
pub mod provider;
pub mod rewrite;

pub use gemini::GeminiProvider;
pub use openrouter::OpenRouterProvider;
pub use provider::{CompletionRequest, CompletionResponse, LlmProvider};
pub use rewrite::{RewriteAdapter, RewriteParams, Rewriter};

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::error::LlmError;

/// Build the rewrite chain in priority order: Gemini, then OpenRouter.
///
/// Providers without an API key are left out. An empty chain is valid; the
/// orchestrator then always uses the fallback article.
pub fn create_rewriters(config: &RelayConfig) -> Result<Vec<Arc<dyn Rewriter>>, LlmError> {
    let client = reqwest::Client::builder()
        .timeout(config.generation.timeout)
        .build()
        .map_err(|e| LlmError::RequestFailed {
            provider: "http".to_string(),
            reason: format!("Failed to build HTTP client: {}", e),
        })?;

    let generation = &config.generation;
    let mut rewriters: Vec<Arc<dyn Rewriter>> = Vec::new();

    if let Some(gemini) = &config.gemini {
        let provider = GeminiProvider::new(gemini, client.clone());
        tracing::info!("Using Gemini (model: {})", gemini.model);
        rewriters.push(Arc::new(RewriteAdapter::new(
            Arc::new(provider),
            RewriteParams {
                temperature: generation.temperature,
                max_tokens: generation.max_output_tokens,
                max_attempts: gemini.max_attempts,
            },
        )));
    }

    if let Some(openrouter) = &config.openrouter {
        let provider = OpenRouterProvider::new(openrouter, client.clone());
        tracing::info!("Using OpenRouter (model: {})", openrouter.model);
        rewriters.push(Arc::new(RewriteAdapter::new(
            Arc::new(provider),
            RewriteParams {
                temperature: generation.temperature,
                max_tokens: generation.max_output_tokens,
                max_attempts: openrouter.max_attempts,
            },
        )));
    }

    if rewriters.is_empty() {
        tracing::warn!("No rewrite provider configured; every article will use the fallback");
    }

    Ok(rewriters)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(extra: &[(&'static str, &'static str)]) -> RelayConfig {
        let mut vars = vec![
            ("TELEGRAM_BOT_TOKEN", "123:ABC"),
            ("ALLOWED_CHAT_ID", "42"),
            ("WP_SITE", "https://news.example.com"),
            ("WP_USERNAME", "editor"),
            ("WP_APP_PASSWORD", "secret"),
        ];
        vars.extend_from_slice(extra);
        RelayConfig::from_lookup(|key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap()
    }

    #[test]
    fn rewriters_follow_priority_order() {
        let config = config(&[
            ("OPENROUTER_API_KEY", "or-key"),
            ("OPENROUTER_MODEL", "openai/gpt-4o-mini"),
            ("GEMINI_API_KEY", "g-key"),
        ]);
        let rewriters = create_rewriters(&config).unwrap();
        let names: Vec<&str> = rewriters.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["gemini", "openrouter"]);
    }

    #[test]
    fn no_keys_means_empty_chain() {
        let rewriters = create_rewriters(&config(&[])).unwrap();
        assert!(rewriters.is_empty());
    }
}
