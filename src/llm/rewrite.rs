//! Rewrite adapter: prompt a provider and parse its JSON article.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::llm::prompt::build_rewrite_prompt;
use crate::llm::provider::{CompletionRequest, LlmProvider};
use crate::pipeline::extract::extract_json_object;
use crate::pipeline::types::ProviderCandidate;

/// Delay between sequential attempts against the same provider.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Upper bound on a provider-requested `Retry-After` we are willing to wait.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(5);

/// Turns raw news text into a provider candidate.
#[async_trait]
pub trait Rewriter: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Rewrite `raw_text`; an error means this provider produced nothing usable.
    async fn rewrite(&self, raw_text: &str) -> Result<ProviderCandidate, LlmError>;
}

/// Generation parameters for a rewrite call.
#[derive(Debug, Clone, Copy)]
pub struct RewriteParams {
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_attempts: u32,
}

/// `Rewriter` backed by any `LlmProvider`.
pub struct RewriteAdapter {
    llm: Arc<dyn LlmProvider>,
    params: RewriteParams,
}

impl RewriteAdapter {
    pub fn new(llm: Arc<dyn LlmProvider>, params: RewriteParams) -> Self {
        Self { llm, params }
    }

    async fn attempt(&self, prompt: &str) -> Result<ProviderCandidate, LlmError> {
        let request = CompletionRequest::new(prompt)
            .with_temperature(self.params.temperature)
            .with_max_tokens(self.params.max_tokens);

        let response = self.llm.complete(request).await?;
        parse_candidate(self.llm.name(), &response.content)
    }
}

#[async_trait]
impl Rewriter for RewriteAdapter {
    fn name(&self) -> &str {
        self.llm.name()
    }

    async fn rewrite(&self, raw_text: &str) -> Result<ProviderCandidate, LlmError> {
        let prompt = build_rewrite_prompt(raw_text);
        let attempts = self.params.max_attempts.max(1);

        let mut attempt = 1;
        loop {
            match self.attempt(&prompt).await {
                Ok(candidate) => {
                    debug!(
                        provider = self.name(),
                        model = self.llm.model_name(),
                        attempt,
                        "Provider returned candidate"
                    );
                    return Ok(candidate);
                }
                Err(e) if attempt < attempts => {
                    let delay = retry_delay(&e);
                    warn!(
                        provider = self.name(),
                        attempt,
                        max_attempts = attempts,
                        error = %e,
                        "Rewrite attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Pause before the next attempt: the provider's `Retry-After` when it sent
/// one (capped at `MAX_RETRY_AFTER`), otherwise `RETRY_DELAY`.
fn retry_delay(error: &LlmError) -> Duration {
    match error {
        LlmError::RateLimited {
            retry_after: Some(after),
            ..
        } => (*after).min(MAX_RETRY_AFTER),
        _ => RETRY_DELAY,
    }
}

/// Parse a completion into a candidate via the JSON extractor.
pub fn parse_candidate(provider: &str, completion: &str) -> Result<ProviderCandidate, LlmError> {
    let object = extract_json_object(completion).map_err(|e| LlmError::InvalidResponse {
        provider: provider.to_string(),
        reason: e.to_string(),
    })?;

    if object.is_empty() {
        return Err(LlmError::InvalidResponse {
            provider: provider.to_string(),
            reason: "empty JSON object".into(),
        });
    }

    Ok(serde_json::from_value(serde_json::Value::Object(object))?)
}
