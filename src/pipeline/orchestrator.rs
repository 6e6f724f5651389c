//! SEO generation orchestrator.
//!
//! Tries each rewrite provider strictly in priority order; the first valid
//! candidate wins. Provider errors never escape: when the whole chain fails
//! the deterministic fallback article is returned instead.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{info, warn};

use crate::error::LlmError;
use crate::llm::Rewriter;
use crate::pipeline::fallback::{default_keywords, fallback_article, fallback_slug};
use crate::pipeline::types::{
    ArticleRecord, EXCERPT_MAX, META_DESCRIPTION_MAX, META_TITLE_MAX, ProviderCandidate,
    normalize_whitespace, truncate_chars,
};

static SLUG_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{M}\p{N}]+").expect("valid slug regex"));

/// Which scripts a rewritten body may be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptPolicy {
    /// Reject bodies whose letters are all ASCII (expected: Bengali output).
    RequireNonLatin,
    /// Accept any well-formed candidate.
    Any,
}

impl FromStr for ScriptPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "non-latin" | "non_latin" => Ok(Self::RequireNonLatin),
            "any" => Ok(Self::Any),
            other => Err(format!("unknown script policy '{other}' (expected non-latin or any)")),
        }
    }
}

/// Why one provider's output was not used.
#[derive(Debug)]
pub enum RewriteFailure {
    /// Network, HTTP, or JSON extraction failure.
    Provider(LlmError),
    /// `title` or `content` missing or blank.
    MissingField(&'static str),
    /// Body is Latin-only under `ScriptPolicy::RequireNonLatin`.
    LatinContent,
}

impl fmt::Display for RewriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider(e) => write!(f, "provider error: {e}"),
            Self::MissingField(field) => write!(f, "missing required field '{field}'"),
            Self::LatinContent => write!(f, "content is not in the target script"),
        }
    }
}

/// Produces an `ArticleRecord` for every input.
pub struct SeoGenerator {
    rewriters: Vec<Arc<dyn Rewriter>>,
    script_policy: ScriptPolicy,
    clock: fn() -> DateTime<Utc>,
}

impl SeoGenerator {
    /// Create a generator over providers listed in priority order.
    pub fn new(rewriters: Vec<Arc<dyn Rewriter>>, script_policy: ScriptPolicy) -> Self {
        Self {
            rewriters,
            script_policy,
            clock: Utc::now,
        }
    }

    /// Override the time source used for generated slugs.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Rewrite `raw_text`; never fails.
    pub async fn generate(&self, raw_text: &str) -> ArticleRecord {
        let now = (self.clock)();

        for rewriter in &self.rewriters {
            match self.try_provider(rewriter.as_ref(), raw_text, now).await {
                Ok(record) => {
                    info!(provider = rewriter.name(), "Rewrite accepted");
                    return record;
                }
                Err(failure) => {
                    warn!(
                        provider = rewriter.name(),
                        reason = %failure,
                        "Rewrite rejected, trying next provider"
                    );
                }
            }
        }

        info!(
            providers = self.rewriters.len(),
            "All rewrite providers failed, using fallback article"
        );
        fallback_article(raw_text, now)
    }

    async fn try_provider(
        &self,
        rewriter: &dyn Rewriter,
        raw_text: &str,
        now: DateTime<Utc>,
    ) -> Result<ArticleRecord, RewriteFailure> {
        let candidate = rewriter
            .rewrite(raw_text)
            .await
            .map_err(RewriteFailure::Provider)?;
        validate_candidate(candidate, self.script_policy, now)
    }
}

/// Validate and normalize a provider candidate.
pub fn validate_candidate(
    candidate: ProviderCandidate,
    policy: ScriptPolicy,
    now: DateTime<Utc>,
) -> Result<ArticleRecord, RewriteFailure> {
    let title = required(candidate.title, "title")?;
    let content = required(candidate.content, "content")?;

    if policy == ScriptPolicy::RequireNonLatin && is_latin_only(&content) {
        return Err(RewriteFailure::LatinContent);
    }

    let flat_content = normalize_whitespace(&content);

    let meta_title = non_blank(candidate.meta_title).unwrap_or_else(|| title.clone());
    let meta_description =
        non_blank(candidate.meta_description).unwrap_or_else(|| flat_content.clone());
    let excerpt = non_blank(candidate.excerpt).unwrap_or_else(|| flat_content.clone());

    let mut meta_keywords: Vec<String> = candidate
        .meta_keywords
        .into_iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    if meta_keywords.is_empty() {
        meta_keywords = default_keywords();
    }

    let slug = candidate
        .slug
        .map(|s| sanitize_slug(&s))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| fallback_slug(now));

    Ok(ArticleRecord {
        meta_title: truncate_chars(&meta_title, META_TITLE_MAX),
        meta_description: truncate_chars(&meta_description, META_DESCRIPTION_MAX),
        meta_keywords,
        slug,
        excerpt: truncate_chars(&excerpt, EXCERPT_MAX),
        title,
        content,
    })
}

fn required(value: Option<String>, field: &'static str) -> Result<String, RewriteFailure> {
    non_blank(value).ok_or(RewriteFailure::MissingField(field))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// True when `text` has no non-ASCII letters. Digits, whitespace, punctuation
/// and symbols (typographic quotes, dashes, emoji) never count. Empty text
/// counts as Latin-only.
pub fn is_latin_only(text: &str) -> bool {
    !text.chars().any(|c| c.is_alphabetic() && !c.is_ascii())
}

/// Lowercase, collapse non letter/digit runs to `-`, trim dashes.
pub fn sanitize_slug(raw: &str) -> String {
    SLUG_SEPARATORS
        .replace_all(raw.trim(), "-")
        .trim_matches('-')
        .to_lowercase()
}
