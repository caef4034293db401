use axum::routing::post;
use axum::Router;

use crate::handlers::linking_codes;
use crate::state::AppState;

/// Routes mounted at `/linking-codes`.
///
/// ```text
/// POST   /                          -> create_linking_code
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(linking_codes::create_linking_code))
}
