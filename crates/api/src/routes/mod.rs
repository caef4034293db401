pub mod chats;
pub mod health;
pub mod identity_link;
pub mod linking_codes;
pub mod notifications;
pub mod webhook;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /linking-codes                      issue a code (auth required)
///
/// /identity-link                      get, delete own link (auth required)
///
/// /chats                              tenant chat list (admin only)
/// /chats/{chat_id}/messages           message log (admin only)
///
/// /notifications                      send one (service or admin)
/// /notifications/batch                send many (service or admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/linking-codes", linking_codes::router())
        .nest("/identity-link", identity_link::router())
        .nest("/chats", chats::router())
        .nest("/notifications", notifications::router())
}
