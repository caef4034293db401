//! Route definitions for the `/notifications` resource.
//!
//! All endpoints require the service or admin role.

use axum::routing::post;
use axum::Router;

use crate::handlers::notifications;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// POST   /                          -> send_notification
/// POST   /batch                     -> send_batch
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(notifications::send_notification))
        .route("/batch", post(notifications::send_batch))
}
