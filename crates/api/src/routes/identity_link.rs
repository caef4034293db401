use axum::routing::get;
use axum::Router;

use crate::handlers::identity_link;
use crate::state::AppState;

/// Routes mounted at `/identity-link`.
///
/// ```text
/// GET    /                          -> get_identity_link
/// DELETE /                          -> delete_identity_link
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(identity_link::get_identity_link).delete(identity_link::delete_identity_link),
    )
}
