//! Content-management system integration.
//!
//! `ContentStore` is the seam between the pipeline and the remote CMS:
//! category lookup, post search, and post creation. `WordPressClient` is the
//! production implementation; tests substitute in-memory stores.

pub mod duplicate;
pub mod publish;
pub mod wordpress;

pub use duplicate::{DuplicateGuard, DuplicatePolicy};
pub use publish::PublishGateway;
pub use wordpress::WordPressClient;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::CmsError;

/// Category id used when a label has no match in the CMS.
pub const DEFAULT_CATEGORY_ID: u64 = 1;

/// An existing post returned by a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingPost {
    pub id: u64,
    /// Rendered title as stored by the CMS (may contain HTML entities).
    pub title: String,
}

/// Create-post payload in WordPress REST shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub slug: String,
    pub excerpt: String,
    pub status: String,
    pub categories: Vec<u64>,
    pub meta: SeoMeta,
}

/// SEO fields in the Rank Math metadata namespace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeoMeta {
    pub rank_math_title: String,
    pub rank_math_description: String,
    pub rank_math_focus_keyword: String,
}

/// A post the CMS reports as created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPost {
    pub id: u64,
    pub link: Option<String>,
}

/// Remote content store operations used by the pipeline.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Resolve a category label to its id; `DEFAULT_CATEGORY_ID` when unknown.
    async fn resolve_category(&self, label: &str) -> Result<u64, CmsError>;

    /// Posts whose title/content match `title`, across editorial statuses.
    async fn search_posts(&self, title: &str) -> Result<Vec<ExistingPost>, CmsError>;

    /// Create one post. Never retried.
    async fn create_post(&self, post: &NewPost) -> Result<CreatedPost, CmsError>;
}
