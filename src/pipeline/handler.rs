//! Request handler: one Telegram update in, one acknowledgment out.
//!
//! Flow for an accepted message:
//! 1. `SeoGenerator::generate()` — provider chain with deterministic fallback
//! 2. `Classifier::classify()` — keyword category, resolved to a CMS id
//! 3. `DuplicateGuard::is_duplicate()` — title search, short-circuits publishing
//! 4. `PublishGateway::publish()` — draft or published depending on submitter
//!
//! Every processed message gets exactly one reply in the originating chat.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::channels::ChatNotifier;
use crate::channels::telegram::{TelegramMessage, Update, is_trusted_submitter};
use crate::cms::{ContentStore, DuplicateGuard, PublishGateway};
use crate::error::CmsError;
use crate::pipeline::classifier::Classifier;
use crate::pipeline::orchestrator::SeoGenerator;
use crate::pipeline::types::{CategoryDecision, PublishOutcome, Visibility};

pub const MISSING_TEXT_REPLY: &str = "❌ নিউজ লেখা পাঠান";
pub const DRAFT_REPLY: &str = "✅ নিউজ সফলভাবে WordPress-এ Draft হয়েছে";
pub const PUBLISHED_REPLY: &str = "✅ নিউজ সফলভাবে WordPress-এ প্রকাশিত হয়েছে";
pub const DUPLICATE_REPLY: &str = "⚠️ এই শিরোনামে একটি নিউজ আগে থেকেই আছে, প্রকাশ করা হয়নি";

/// User-visible failure text.
pub fn error_reply(error: &CmsError) -> String {
    format!("❌ ERROR: {error}")
}

/// What happened to one update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// No message, or a chat other than the allowed one. Nothing was sent.
    Ignored,
    /// Message had no usable text; the submitter was asked for some.
    MissingText,
    /// A post was created.
    Published { post_id: u64, visibility: Visibility },
    /// An equivalent post already existed; nothing was created.
    Duplicate,
    /// Category lookup, duplicate search, or post creation failed.
    Failed(String),
}

/// Dependencies for [`RequestHandler`].
pub struct HandlerDeps {
    pub generator: SeoGenerator,
    pub classifier: Classifier,
    pub store: Arc<dyn ContentStore>,
    pub duplicates: DuplicateGuard,
    pub publisher: PublishGateway,
    pub notifier: Arc<dyn ChatNotifier>,
    pub allowed_chat_id: String,
    pub trusted_submitters: Vec<String>,
}

pub struct RequestHandler {
    deps: HandlerDeps,
}

impl RequestHandler {
    pub fn new(deps: HandlerDeps) -> Self {
        Self { deps }
    }

    /// Process one update to completion.
    pub async fn handle(&self, update: Update) -> HandleOutcome {
        let Some(message) = update.message else {
            debug!(update_id = ?update.update_id, "Update has no message, ignoring");
            return HandleOutcome::Ignored;
        };

        let chat_id = message.chat.id.clone();
        if chat_id != self.deps.allowed_chat_id {
            warn!(chat_id = %chat_id, "Message from unauthorized chat, ignoring");
            return HandleOutcome::Ignored;
        }

        let text = message.text.as_deref().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            self.reply(&chat_id, MISSING_TEXT_REPLY).await;
            return HandleOutcome::MissingText;
        }

        let visibility = self.visibility_for(&message);
        info!(
            chat_id = %chat_id,
            sender = %message.from.as_ref().map(|s| s.display_name()).unwrap_or_default(),
            chars = text.chars().count(),
            visibility = visibility.wp_status(),
            "News submission received"
        );

        match self.process(text, visibility).await {
            Ok(PublishOutcome::Created {
                post_id,
                visibility,
                link,
            }) => {
                info!(
                    post_id,
                    link = link.as_deref().unwrap_or_default(),
                    "Submission posted"
                );
                let reply = match visibility {
                    Visibility::Draft => DRAFT_REPLY,
                    Visibility::Published => PUBLISHED_REPLY,
                };
                self.reply(&chat_id, reply).await;
                HandleOutcome::Published {
                    post_id,
                    visibility,
                }
            }
            Ok(PublishOutcome::SkippedDuplicate { title }) => {
                info!(title = %title, "Duplicate submission, not publishing");
                self.reply(&chat_id, DUPLICATE_REPLY).await;
                HandleOutcome::Duplicate
            }
            Err(e) => {
                error!(chat_id = %chat_id, error = %e, "Failed to publish submission");
                self.reply(&chat_id, &error_reply(&e)).await;
                HandleOutcome::Failed(e.to_string())
            }
        }
    }

    async fn process(
        &self,
        raw_text: &str,
        visibility: Visibility,
    ) -> Result<PublishOutcome, CmsError> {
        let article = self.deps.generator.generate(raw_text).await;

        let label = self
            .deps
            .classifier
            .classify(&article.classification_text())
            .to_string();
        let id = self.deps.store.resolve_category(&label).await?;
        let category = CategoryDecision { label, id };

        if self.deps.duplicates.is_duplicate(&article.title).await? {
            return Ok(PublishOutcome::SkippedDuplicate {
                title: article.title,
            });
        }

        self.deps
            .publisher
            .publish(&article, &category, visibility)
            .await
    }

    fn visibility_for(&self, message: &TelegramMessage) -> Visibility {
        let trusted = message
            .from
            .as_ref()
            .is_some_and(|s| is_trusted_submitter(&self.deps.trusted_submitters, &s.id));
        if trusted {
            Visibility::Published
        } else {
            Visibility::Draft
        }
    }

    async fn reply(&self, chat_id: &str, text: &str) {
        if let Err(e) = self.deps.notifier.send_text(chat_id, text).await {
            warn!(chat_id = %chat_id, error = %e, "Failed to send acknowledgment");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::channels::telegram::{Chat, Sender};
    use crate::cms::{CreatedPost, DEFAULT_CATEGORY_ID, DuplicatePolicy, ExistingPost, NewPost};
    use crate::error::{ChannelError, LlmError};
    use crate::llm::Rewriter;
    use crate::pipeline::fallback::fallback_article;
    use crate::pipeline::orchestrator::ScriptPolicy;
    use crate::pipeline::types::ProviderCandidate;

    const CHAT: &str = "-100500";

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    // ── Stubs ───────────────────────────────────────────────────────

    /// Provider that is never reachable.
    struct DownRewriter {
        calls: Arc<Mutex<usize>>,
    }

    #[async_trait]
    impl Rewriter for DownRewriter {
        fn name(&self) -> &str {
            "down"
        }

        async fn rewrite(&self, _raw_text: &str) -> Result<ProviderCandidate, LlmError> {
            *self.calls.lock().unwrap() += 1;
            Err(LlmError::RequestFailed {
                provider: "down".into(),
                reason: "connection refused".into(),
            })
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        categories: HashMap<String, u64>,
        existing_titles: Vec<String>,
        fail_create: bool,
        created: Mutex<Vec<NewPost>>,
        searches: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ContentStore for MemoryStore {
        async fn resolve_category(&self, label: &str) -> Result<u64, CmsError> {
            Ok(self
                .categories
                .get(label)
                .copied()
                .unwrap_or(DEFAULT_CATEGORY_ID))
        }

        async fn search_posts(&self, title: &str) -> Result<Vec<ExistingPost>, CmsError> {
            self.searches.lock().unwrap().push(title.to_string());
            Ok(self
                .existing_titles
                .iter()
                .filter(|t| t.contains(title))
                .map(|t| ExistingPost {
                    id: 9,
                    title: t.clone(),
                })
                .collect())
        }

        async fn create_post(&self, post: &NewPost) -> Result<CreatedPost, CmsError> {
            if self.fail_create {
                return Err(CmsError::Status {
                    operation: "create_post".into(),
                    status: 500,
                    body: "internal error".into(),
                });
            }
            let mut created = self.created.lock().unwrap();
            created.push(post.clone());
            Ok(CreatedPost {
                id: 100 + created.len() as u64,
                link: None,
            })
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl ChatNotifier for RecordingNotifier {
        async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), ChannelError> {
            self.sent
                .lock()
                .unwrap()
                .push((chat_id.to_string(), text.to_string()));
            if self.fail {
                return Err(ChannelError::SendFailed {
                    name: "telegram".into(),
                    reason: "blocked".into(),
                });
            }
            Ok(())
        }
    }

    struct Harness {
        handler: RequestHandler,
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
        rewrite_calls: Arc<Mutex<usize>>,
    }

    fn harness(store: MemoryStore, notifier: RecordingNotifier) -> Harness {
        let store = Arc::new(store);
        let notifier = Arc::new(notifier);
        let rewrite_calls = Arc::new(Mutex::new(0));
        let rewriter: Arc<dyn Rewriter> = Arc::new(DownRewriter {
            calls: rewrite_calls.clone(),
        });

        let handler = RequestHandler::new(HandlerDeps {
            generator: SeoGenerator::new(vec![rewriter], ScriptPolicy::RequireNonLatin)
                .with_clock(fixed_now),
            classifier: Classifier::default_categories(),
            store: store.clone(),
            duplicates: DuplicateGuard::new(store.clone(), DuplicatePolicy::AnyMatch),
            publisher: PublishGateway::new(store.clone()),
            notifier: notifier.clone(),
            allowed_chat_id: CHAT.into(),
            trusted_submitters: vec!["42".into()],
        });

        Harness {
            handler,
            store,
            notifier,
            rewrite_calls,
        }
    }

    fn update(chat: &str, text: Option<&str>, from: Option<&str>) -> Update {
        Update {
            update_id: Some(1),
            message: Some(TelegramMessage {
                chat: Chat { id: chat.into() },
                text: text.map(str::to_string),
                from: from.map(|id| Sender {
                    id: id.into(),
                    first_name: Some("Reporter".into()),
                    last_name: None,
                }),
            }),
        }
    }

    const ARREST: &str = "পুলিশ আজ একটি চুরি মামলায় একজনকে গ্রেপ্তার করেছে। বিস্তারিত পরে জানানো হবে।";

    fn crime_store() -> MemoryStore {
        MemoryStore {
            categories: HashMap::from([("অপরাধ".to_string(), 12)]),
            ..Default::default()
        }
    }

    // ── Scenarios ───────────────────────────────────────────────────

    #[tokio::test]
    async fn fallback_article_is_drafted_under_crime() {
        let h = harness(crime_store(), RecordingNotifier::default());

        let outcome = h.handler.handle(update(CHAT, Some(ARREST), Some("7"))).await;

        assert_eq!(
            outcome,
            HandleOutcome::Published {
                post_id: 101,
                visibility: Visibility::Draft
            }
        );
        let created = h.store.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].title, "পুলিশ আজ একটি চুরি মামলায় একজনকে গ্রেপ্তার করেছে");
        assert_eq!(created[0].categories, vec![12]);
        assert_eq!(created[0].status, "draft");
        assert_eq!(created[0].slug, fallback_article(ARREST, fixed_now()).slug);
        assert_eq!(
            *h.notifier.sent.lock().unwrap(),
            vec![(CHAT.to_string(), DRAFT_REPLY.to_string())]
        );
        assert_eq!(*h.rewrite_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn trusted_submitter_publishes_immediately() {
        let h = harness(crime_store(), RecordingNotifier::default());

        let outcome = h.handler.handle(update(CHAT, Some(ARREST), Some("42"))).await;

        assert!(matches!(
            outcome,
            HandleOutcome::Published {
                visibility: Visibility::Published,
                ..
            }
        ));
        assert_eq!(h.store.created.lock().unwrap()[0].status, "publish");
        assert_eq!(h.notifier.sent.lock().unwrap()[0].1, PUBLISHED_REPLY);
    }

    #[tokio::test]
    async fn duplicate_title_is_never_published() {
        let store = MemoryStore {
            existing_titles: vec![
                "পুলিশ আজ একটি চুরি মামলায় একজনকে গ্রেপ্তার করেছে".to_string(),
            ],
            ..crime_store()
        };
        let h = harness(store, RecordingNotifier::default());

        let outcome = h.handler.handle(update(CHAT, Some(ARREST), Some("42"))).await;

        assert_eq!(outcome, HandleOutcome::Duplicate);
        assert!(h.store.created.lock().unwrap().is_empty());
        assert_eq!(h.notifier.sent.lock().unwrap()[0].1, DUPLICATE_REPLY);
    }

    #[tokio::test]
    async fn empty_text_is_rejected_without_rewrite() {
        let h = harness(crime_store(), RecordingNotifier::default());

        for text in [None, Some(""), Some("   \n ")] {
            let outcome = h.handler.handle(update(CHAT, text, Some("7"))).await;
            assert_eq!(outcome, HandleOutcome::MissingText);
        }

        assert_eq!(*h.rewrite_calls.lock().unwrap(), 0);
        assert!(h.store.searches.lock().unwrap().is_empty());
        assert!(h.store.created.lock().unwrap().is_empty());
        let sent = h.notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|(chat, text)| chat == CHAT && text == MISSING_TEXT_REPLY));
    }

    #[tokio::test]
    async fn foreign_chat_is_ignored_silently() {
        let h = harness(crime_store(), RecordingNotifier::default());

        let outcome = h.handler.handle(update("999", Some(ARREST), Some("42"))).await;

        assert_eq!(outcome, HandleOutcome::Ignored);
        assert!(h.notifier.sent.lock().unwrap().is_empty());
        assert_eq!(*h.rewrite_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn update_without_message_is_ignored() {
        let h = harness(crime_store(), RecordingNotifier::default());
        let outcome = h.handler.handle(Update::default()).await;
        assert_eq!(outcome, HandleOutcome::Ignored);
        assert!(h.notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn publish_failure_is_reported_to_chat() {
        let store = MemoryStore {
            fail_create: true,
            ..crime_store()
        };
        let h = harness(store, RecordingNotifier::default());

        let outcome = h.handler.handle(update(CHAT, Some(ARREST), None)).await;

        let HandleOutcome::Failed(reason) = outcome else {
            panic!("Expected Failed, got {outcome:?}");
        };
        assert!(reason.contains("500"));
        let sent = h.notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.starts_with("❌ ERROR: "));
        assert!(sent[0].1.contains("internal error"));
    }

    #[tokio::test]
    async fn acknowledgment_failure_does_not_change_outcome() {
        let notifier = RecordingNotifier {
            fail: true,
            ..Default::default()
        };
        let h = harness(crime_store(), notifier);

        let outcome = h.handler.handle(update(CHAT, Some(ARREST), Some("7"))).await;

        assert!(matches!(outcome, HandleOutcome::Published { .. }));
        assert_eq!(h.notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unmatched_text_uses_default_category() {
        let h = harness(crime_store(), RecordingNotifier::default());

        h.handler
            .handle(update(CHAT, Some("আজ আকাশ মেঘলা থাকবে।"), Some("7")))
            .await;

        let created = h.store.created.lock().unwrap();
        assert_eq!(created[0].categories, vec![DEFAULT_CATEGORY_ID]);
    }
}
