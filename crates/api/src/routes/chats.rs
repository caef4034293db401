//! Route definitions for the `/chats` resource.
//!
//! All endpoints require the admin role.

use axum::routing::get;
use axum::Router;

use crate::handlers::chats;
use crate::state::AppState;

/// Routes mounted at `/chats`.
///
/// ```text
/// GET    /                          -> list_chats
/// GET    /{chat_id}/messages        -> list_messages
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(chats::list_chats))
        .route("/{chat_id}/messages", get(chats::list_messages))
}
