//! Platform webhook, mounted at the root (not under `/api/v1`).

use axum::routing::post;
use axum::Router;

use crate::handlers::webhook;
use crate::state::AppState;

/// ```text
/// POST   /webhooks/telegram         -> receive_update
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/webhooks/telegram", post(webhook::receive_update))
}
