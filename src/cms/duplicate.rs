//! Duplicate detection before publishing.
//!
//! Detection is approximate: it relies on the CMS's title search. Posts that
//! cover the same story under a different title are not caught.

use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info};

use crate::cms::{ContentStore, ExistingPost};
use crate::error::CmsError;
use crate::pipeline::types::normalize_whitespace;

/// How search hits are turned into a duplicate verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Any search hit is a duplicate.
    AnyMatch,
    /// Only a hit whose normalized title equals the candidate's.
    NormalizedTitle,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any-match" | "any_match" => Ok(Self::AnyMatch),
            "normalized-title" | "normalized_title" => Ok(Self::NormalizedTitle),
            other => Err(format!(
                "unknown duplicate policy '{other}' (expected any-match or normalized-title)"
            )),
        }
    }
}

/// Checks the CMS for an existing post before a new one is created.
pub struct DuplicateGuard {
    store: Arc<dyn ContentStore>,
    policy: DuplicatePolicy,
}

impl DuplicateGuard {
    pub fn new(store: Arc<dyn ContentStore>, policy: DuplicatePolicy) -> Self {
        Self { store, policy }
    }

    /// Whether a post equivalent to `title` already exists.
    pub async fn is_duplicate(&self, title: &str) -> Result<bool, CmsError> {
        let hits = self.store.search_posts(title).await?;
        let duplicate = match self.policy {
            DuplicatePolicy::AnyMatch => !hits.is_empty(),
            DuplicatePolicy::NormalizedTitle => {
                let wanted = normalize_title(title);
                hits.iter().any(|p| normalize_title(&p.title) == wanted)
            }
        };

        if duplicate {
            info!(
                title,
                hits = hits.len(),
                matched_ids = ?hits.iter().map(|p: &ExistingPost| p.id).collect::<Vec<_>>(),
                "Existing post found"
            );
        } else {
            debug!(title, hits = hits.len(), "No duplicate post");
        }
        Ok(duplicate)
    }
}

/// Decode common HTML entities, collapse whitespace, lowercase.
pub fn normalize_title(title: &str) -> String {
    let decoded = title
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#8217;", "'")
        .replace("&#8216;", "'")
        .replace("&#8220;", "\"")
        .replace("&#8221;", "\"")
        .replace("&#8211;", "-")
        .replace("&#8212;", "-")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ");
    normalize_whitespace(&decoded).to_lowercase()
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::cms::{CreatedPost, NewPost};

    /// Store that answers every search with fixed titles.
    struct SearchStub {
        titles: Vec<&'static str>,
        fail: bool,
    }

    #[async_trait]
    impl ContentStore for SearchStub {
        async fn resolve_category(&self, _label: &str) -> Result<u64, CmsError> {
            unimplemented!("not used by duplicate guard")
        }

        async fn search_posts(&self, _title: &str) -> Result<Vec<ExistingPost>, CmsError> {
            if self.fail {
                return Err(CmsError::RequestFailed {
                    operation: "search_posts".into(),
                    reason: "timeout".into(),
                });
            }
            Ok(self
                .titles
                .iter()
                .enumerate()
                .map(|(i, t)| ExistingPost {
                    id: i as u64 + 1,
                    title: t.to_string(),
                })
                .collect())
        }

        async fn create_post(&self, _post: &NewPost) -> Result<CreatedPost, CmsError> {
            unimplemented!("not used by duplicate guard")
        }
    }

    fn guard(titles: Vec<&'static str>, policy: DuplicatePolicy) -> DuplicateGuard {
        DuplicateGuard::new(Arc::new(SearchStub { titles, fail: false }), policy)
    }

    #[tokio::test]
    async fn any_match_treats_every_hit_as_duplicate() {
        let g = guard(vec!["ভিন্ন শিরোনাম"], DuplicatePolicy::AnyMatch);
        assert!(g.is_duplicate("ঢাকায় বৃষ্টি").await.unwrap());
    }

    #[tokio::test]
    async fn no_hits_is_not_duplicate() {
        for policy in [DuplicatePolicy::AnyMatch, DuplicatePolicy::NormalizedTitle] {
            let g = guard(vec![], policy);
            assert!(!g.is_duplicate("ঢাকায় বৃষ্টি").await.unwrap());
        }
    }

    #[tokio::test]
    async fn normalized_title_requires_equal_title() {
        let g = guard(
            vec!["ঢাকায় বৃষ্টি, জনজীবন ব্যাহত", "ঢাকায়  বৃষ্টি "],
            DuplicatePolicy::NormalizedTitle,
        );
        assert!(g.is_duplicate("ঢাকায় বৃষ্টি").await.unwrap());

        let g = guard(vec!["ঢাকায় বৃষ্টি, জনজীবন ব্যাহত"], DuplicatePolicy::NormalizedTitle);
        assert!(!g.is_duplicate("ঢাকায় বৃষ্টি").await.unwrap());
    }

    #[tokio::test]
    async fn search_errors_propagate() {
        let g = DuplicateGuard::new(
            Arc::new(SearchStub {
                titles: vec![],
                fail: true,
            }),
            DuplicatePolicy::AnyMatch,
        );
        assert!(g.is_duplicate("x").await.is_err());
    }

    #[test]
    fn normalize_title_decodes_entities() {
        assert_eq!(
            normalize_title("Dhaka &#8211; Rain &amp;  Floods"),
            "dhaka - rain & floods"
        );
    }

    #[test]
    fn policy_parses() {
        assert_eq!(
            "any-match".parse::<DuplicatePolicy>().unwrap(),
            DuplicatePolicy::AnyMatch
        );
        assert_eq!(
            "Normalized_Title".parse::<DuplicatePolicy>().unwrap(),
            DuplicatePolicy::NormalizedTitle
        );
        assert!("fuzzy".parse::<DuplicatePolicy>().is_err());
    }
}
