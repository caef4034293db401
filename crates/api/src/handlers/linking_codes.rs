//! Handlers for the `/linking-codes` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chatlink_core::linking::deep_link;
use chatlink_core::types::Timestamp;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct IssuedLinkingCode {
    pub code: String,
    /// `https://t.me/<bot>?start=<code>`; opening it sends `/start <code>`.
    pub deep_link: String,
    pub expires_at: Timestamp,
}

/// POST /api/v1/linking-codes
///
/// Issue a single-use code bound to the caller's user id and tenant.
pub async fn create_linking_code(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<DataResponse<IssuedLinkingCode>>)> {
    let issued = state
        .services
        .authority
        .generate_code(&auth.user_id, &auth.tenant_id)
        .await?;

    tracing::info!(
        user_id = %auth.user_id,
        tenant_id = %auth.tenant_id,
        expires_at = %issued.expires_at,
        "Linking code issued"
    );

    let deep_link = deep_link(&state.services.config.bot_username, &issued.code);
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: IssuedLinkingCode {
                code: issued.code,
                deep_link,
                expires_at: issued.expires_at,
            },
        }),
    ))
}
