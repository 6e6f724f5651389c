//! Shared types for the rewrite-and-publish pipeline.

use serde::{Deserialize, Deserializer};

/// Maximum length of `meta_title`, in characters.
pub const META_TITLE_MAX: usize = 60;
/// Maximum length of `meta_description`, in characters.
pub const META_DESCRIPTION_MAX: usize = 160;
/// Conventional excerpt length, in characters.
pub const EXCERPT_MAX: usize = 120;

// ── Article record ──────────────────────────────────────────────────

/// A rewritten, validated article ready for publication.
///
/// Every field is populated by the time it reaches the publish gateway;
/// see `pipeline::fallback` for what "minimally valid" means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub title: String,
    pub content: String,
    pub meta_title: String,
    pub meta_description: String,
    pub meta_keywords: Vec<String>,
    pub slug: String,
    pub excerpt: String,
}

impl ArticleRecord {
    /// Text the classifier looks at: title and body together.
    pub fn classification_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }
}

// ── Provider candidate ──────────────────────────────────────────────

/// Raw, unvalidated article fields as returned by one rewrite provider.
///
/// Models are asked for snake_case keys but sometimes answer in camelCase,
/// and keywords arrive either as a list or as one comma-separated string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderCandidate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, alias = "metaTitle")]
    pub meta_title: Option<String>,
    #[serde(default, alias = "metaDescription")]
    pub meta_description: Option<String>,
    #[serde(default, alias = "metaKeywords", deserialize_with = "keywords")]
    pub meta_keywords: Vec<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
}

fn keywords<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Keywords {
        List(Vec<String>),
        Joined(String),
        Missing(()),
    }

    Ok(match Keywords::deserialize(deserializer)? {
        Keywords::List(list) => list,
        Keywords::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        Keywords::Missing(()) => Vec::new(),
    })
}

// ── Category ────────────────────────────────────────────────────────

/// Classifier result resolved against the CMS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDecision {
    /// Matched category label.
    pub label: String,
    /// CMS category identifier.
    pub id: u64,
}

// ── Publishing ──────────────────────────────────────────────────────

/// Whether a created post is public immediately or held for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Draft,
    Published,
}

impl Visibility {
    /// WordPress post status for this visibility.
    pub fn wp_status(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "publish",
        }
    }
}

/// Result of a publish attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// A new post was created.
    Created {
        post_id: u64,
        visibility: Visibility,
        link: Option<String>,
    },
    /// An equivalent post already exists; nothing was written.
    SkippedDuplicate { title: String },
}

// ── Text helpers ────────────────────────────────────────────────────

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep at most `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
