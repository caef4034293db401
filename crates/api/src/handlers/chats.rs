//! Admin handlers for the `/chats` ledger.
//!
//! Both endpoints are scoped to the admin's own tenant. A chat belonging to
//! another tenant is reported as not found.

use axum::extract::{Path, Query, State};
use axum::Json;
use chatlink_core::chat::{ChatMessage, ChatRecord};
use chatlink_core::error::CoreError;
use chatlink_core::types::ChatId;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default page size for message listing.
const DEFAULT_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    /// Maximum number of messages, newest first. Defaults to 50, capped at 200.
    pub limit: Option<i64>,
}

/// GET /api/v1/chats
pub async fn list_chats(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ChatRecord>>>> {
    let chats = state.services.ledger.list_by_tenant(&admin.tenant_id).await?;
    Ok(Json(DataResponse { data: chats }))
}

/// GET /api/v1/chats/{chat_id}/messages
pub async fn list_messages(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(chat_id): Path<ChatId>,
    Query(params): Query<MessageQuery>,
) -> AppResult<Json<DataResponse<Vec<ChatMessage>>>> {
    let ledger = &state.services.ledger;
    let in_tenant = ledger
        .find(chat_id)
        .await?
        .is_some_and(|chat| chat.tenant_id.as_deref() == Some(admin.tenant_id.as_str()));
    if !in_tenant {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Chat",
            id: chat_id.to_string(),
        }));
    }

    let messages = ledger
        .messages(chat_id, params.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(Json(DataResponse { data: messages }))
}
