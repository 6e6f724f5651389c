//! Wiring: turn a `RelayConfig` into a ready-to-serve router.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;

use crate::channels::{ChatNotifier, TelegramClient, WebhookState, webhook_routes};
use crate::cms::{ContentStore, DuplicateGuard, PublishGateway, WordPressClient};
use crate::config::RelayConfig;
use crate::error::{ChannelError, Error};
use crate::llm::create_rewriters;
use crate::pipeline::classifier::Classifier;
use crate::pipeline::{HandlerDeps, RequestHandler, SeoGenerator};

/// Timeout for outbound acknowledgment calls.
const TELEGRAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the request handler with production clients.
pub fn build_handler(config: &RelayConfig) -> Result<RequestHandler, Error> {
    let rewriters = create_rewriters(config)?;
    let generator = SeoGenerator::new(rewriters, config.generation.script_policy);

    let store: Arc<dyn ContentStore> = Arc::new(WordPressClient::new(&config.wordpress)?);

    let http = reqwest::Client::builder()
        .timeout(TELEGRAM_TIMEOUT)
        .build()
        .map_err(|e| ChannelError::SendFailed {
            name: "telegram".into(),
            reason: format!("Failed to build HTTP client: {e}"),
        })?;
    let notifier: Arc<dyn ChatNotifier> = Arc::new(TelegramClient::new(
        config.telegram.bot_token.clone(),
        &config.telegram.api_base,
        http,
    ));

    Ok(RequestHandler::new(HandlerDeps {
        generator,
        classifier: Classifier::default_categories(),
        store: store.clone(),
        duplicates: DuplicateGuard::new(store.clone(), config.wordpress.duplicate_policy),
        publisher: PublishGateway::new(store),
        notifier,
        allowed_chat_id: config.telegram.allowed_chat_id.clone(),
        trusted_submitters: config.telegram.trusted_submitters.clone(),
    }))
}

/// Build the full HTTP router.
pub fn build_router(config: &RelayConfig) -> Result<Router, Error> {
    let handler = Arc::new(build_handler(config)?);
    Ok(webhook_routes(WebhookState { handler }))
}
