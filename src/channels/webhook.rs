//! Inbound HTTP surface: the Telegram webhook and a liveness probe.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::{Instrument, debug, info_span, warn};
use uuid::Uuid;

use crate::channels::telegram::Update;
use crate::pipeline::handler::RequestHandler;

/// Shared state for webhook routes.
#[derive(Clone)]
pub struct WebhookState {
    pub handler: Arc<RequestHandler>,
}

/// POST /api/telegram
///
/// Always answers `{"ok": true}` so Telegram does not redeliver, even when
/// the body is not a valid update.
async fn receive_update(State(state): State<WebhookState>, body: Bytes) -> Json<Value> {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, bytes = body.len(), "Malformed update body, ignoring");
            return Json(json!({"ok": true}));
        }
    };

    let span = info_span!("update", request_id = %Uuid::new_v4());
    let outcome = state.handler.handle(update).instrument(span).await;
    debug!(?outcome, "Update handled");

    Json(json!({"ok": true}))
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Build the webhook routes.
pub fn webhook_routes(state: WebhookState) -> Router {
    Router::new()
        .route("/api/telegram", post(receive_update))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
