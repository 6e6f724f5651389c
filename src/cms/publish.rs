//! Publish gateway: one create-post call per article.

use std::sync::Arc;

use tracing::info;

use crate::cms::{ContentStore, NewPost, SeoMeta};
use crate::error::CmsError;
use crate::pipeline::types::{ArticleRecord, CategoryDecision, PublishOutcome, Visibility};

pub struct PublishGateway {
    store: Arc<dyn ContentStore>,
}

impl PublishGateway {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Create the post. A single attempt; errors propagate to the caller.
    pub async fn publish(
        &self,
        article: &ArticleRecord,
        category: &CategoryDecision,
        visibility: Visibility,
    ) -> Result<PublishOutcome, CmsError> {
        let post = build_post(article, category, visibility);
        let created = self.store.create_post(&post).await?;

        info!(
            post_id = created.id,
            category = %category.label,
            status = visibility.wp_status(),
            slug = %post.slug,
            "Post created"
        );

        Ok(PublishOutcome::Created {
            post_id: created.id,
            visibility,
            link: created.link,
        })
    }
}

/// Map an article onto the WordPress create-post payload.
pub fn build_post(
    article: &ArticleRecord,
    category: &CategoryDecision,
    visibility: Visibility,
) -> NewPost {
    NewPost {
        title: article.title.clone(),
        content: article.content.clone(),
        slug: article.slug.clone(),
        excerpt: article.excerpt.clone(),
        status: visibility.wp_status().to_string(),
        categories: vec![category.id],
        meta: SeoMeta {
            rank_math_title: article.meta_title.clone(),
            rank_math_description: article.meta_description.clone(),
            rank_math_focus_keyword: article.meta_keywords.join(", "),
        },
    }
}
