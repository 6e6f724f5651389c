//! WordPress REST API client.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::cms::{ContentStore, CreatedPost, DEFAULT_CATEGORY_ID, ExistingPost, NewPost};
use crate::config::WordPressConfig;
use crate::error::CmsError;

/// Statuses searched for duplicates; drafts count, trash does not.
const SEARCH_STATUSES: &str = "publish,future,draft,pending,private";

/// Maximum search hits fetched for duplicate detection.
const SEARCH_PAGE_SIZE: &str = "5";

pub struct WordPressClient {
    site_url: String,
    username: String,
    app_password: SecretString,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct CategoryItem {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct PostItem {
    id: u64,
    #[serde(default)]
    title: RenderedField,
}

#[derive(Debug, Default, Deserialize)]
struct RenderedField {
    #[serde(default)]
    rendered: String,
}

#[derive(Debug, Deserialize)]
struct CreatedItem {
    id: u64,
    #[serde(default)]
    link: Option<String>,
}

impl WordPressClient {
    pub fn new(config: &WordPressConfig) -> Result<Self, CmsError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CmsError::RequestFailed {
                operation: "client".into(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            site_url: config.site_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            app_password: config.app_password.clone(),
            client,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/wp-json/wp/v2/{path}", self.site_url)
    }

    /// Send an authenticated request and decode a JSON body.
    async fn send_json<T>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, CmsError>
    where
        T: serde::de::DeserializeOwned,
    {
        let resp = request
            .basic_auth(&self.username, Some(self.app_password.expose_secret()))
            .send()
            .await
            .map_err(|e| CmsError::RequestFailed {
                operation: operation.into(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CmsError::Status {
                operation: operation.into(),
                status: status.as_u16(),
                body: body.chars().take(300).collect(),
            });
        }

        resp.json().await.map_err(|e| CmsError::InvalidResponse {
            operation: operation.into(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl ContentStore for WordPressClient {
    async fn resolve_category(&self, label: &str) -> Result<u64, CmsError> {
        let request = self
            .client
            .get(self.api_url("categories"))
            .query(&[("search", label)]);
        let items: Vec<CategoryItem> = self.send_json("resolve_category", request).await?;

        let id = items.first().map(|c| c.id).unwrap_or(DEFAULT_CATEGORY_ID);
        debug!(label, id, "Resolved category");
        Ok(id)
    }

    async fn search_posts(&self, title: &str) -> Result<Vec<ExistingPost>, CmsError> {
        let request = self.client.get(self.api_url("posts")).query(&[
            ("search", title),
            ("status", SEARCH_STATUSES),
            ("per_page", SEARCH_PAGE_SIZE),
            ("_fields", "id,title"),
        ]);
        let items: Vec<PostItem> = self.send_json("search_posts", request).await?;

        Ok(items
            .into_iter()
            .map(|p| ExistingPost {
                id: p.id,
                title: p.title.rendered,
            })
            .collect())
    }

    async fn create_post(&self, post: &NewPost) -> Result<CreatedPost, CmsError> {
        let request = self.client.post(self.api_url("posts")).json(post);
        let created: CreatedItem = self.send_json("create_post", request).await?;

        Ok(CreatedPost {
            id: created.id,
            link: created.link,
        })
    }
}
