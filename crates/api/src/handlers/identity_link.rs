//! Handlers for the caller's own `/identity-link`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chatlink_core::error::CoreError;
use chatlink_core::identity::IdentityLink;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// The caller's active link inside the caller's tenant.
async fn own_link(state: &AppState, auth: &AuthUser) -> AppResult<Option<IdentityLink>> {
    Ok(state
        .services
        .links
        .resolve_by_tenant_user(Some(&auth.tenant_id), &auth.user_id)
        .await?)
}

/// GET /api/v1/identity-link
///
/// Returns `{ "data": null }` when the caller has no linked chat.
pub async fn get_identity_link(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Option<IdentityLink>>>> {
    let link = own_link(&state, &auth).await?;
    Ok(Json(DataResponse { data: link }))
}

/// DELETE /api/v1/identity-link
///
/// Unlink from the app side. The chat rows of the external identity are
/// marked unlinked as well. Returns 204, or 404 if nothing was linked.
pub async fn delete_identity_link(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<StatusCode> {
    let Some(link) = own_link(&state, &auth).await? else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "IdentityLink",
            id: auth.user_id,
        }));
    };

    let services = &state.services;
    if services.links.unlink(link.external_id).await?.is_some() {
        services
            .ledger
            .propagate_linkage(link.external_id, None)
            .await?;
    }
    tracing::info!(
        user_id = %auth.user_id,
        external_id = link.external_id,
        "Identity unlinked from the app"
    );
    Ok(StatusCode::NO_CONTENT)
}
