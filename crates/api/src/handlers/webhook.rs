//! Handler for the platform webhook.
//!
//! The platform redelivers anything that does not get a 2xx, so every
//! update is acknowledged with `200 {"ok": true}`: malformed bodies,
//! duplicates, domain refusals and absorbed infrastructure failures alike.
//! The only exception is a secret-token mismatch, which is rejected with 401
//! before the body is looked at.
//!
//! Processing runs on its own task. The ack waits for it up to the update
//! deadline and no longer.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chatlink_core::error::CoreError;
use chatlink_telegram::Update;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Header the platform echoes back when a webhook secret is registered.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// POST /webhooks/telegram
pub async fn receive_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<Value>> {
    if let Some(expected) = state.config.telegram.webhook_secret.as_deref() {
        let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if provided != Some(expected) {
            tracing::warn!("Webhook call with missing or wrong secret token");
            return Err(AppError::Core(CoreError::Unauthorized(
                "Invalid webhook secret".into(),
            )));
        }
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(error = %e, bytes = body.len(), "Discarding malformed update");
            return Ok(ack());
        }
    };

    let update_id = update.update_id;
    let chat_id = update.chat_id();
    let deadline = state.config.update_deadline();
    let router = state.services.router.clone();
    // The task outlives the deadline: once `mark_seen` has run, a redelivery
    // is dropped as a duplicate, so the work must finish on its own.
    let task = tokio::spawn(async move { router.handle_update(&update).await });

    match tokio::time::timeout(deadline, task).await {
        Ok(Ok(outcome)) => {
            tracing::debug!(update_id, ?chat_id, outcome = ?outcome, "Update processed");
        }
        Ok(Err(e)) => {
            tracing::error!(update_id, ?chat_id, error = %e, "Update processing task failed");
        }
        Err(_) => {
            tracing::warn!(
                update_id,
                ?chat_id,
                deadline_secs = deadline.as_secs(),
                "Update still processing at deadline, acknowledging early"
            );
        }
    }

    Ok(ack())
}

fn ack() -> Json<Value> {
    Json(json!({ "ok": true }))
}
