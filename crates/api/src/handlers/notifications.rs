//! Handlers for `/notifications`, called by the tenant backend.
//!
//! Delivery is always scoped to the tenant in the caller's token.

use axum::extract::State;
use axum::Json;
use chatlink_bot::{BatchReport, DeliveryOutcome, NotificationRequest};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireService;
use crate::response::DataResponse;
use crate::state::AppState;

/// Upper bound on notifications accepted in one batch request.
const MAX_BATCH_SIZE: usize = 500;

#[derive(Debug, Serialize)]
pub struct SendResult {
    pub delivered: bool,
    /// `sent`, `not_linked` or `failed`.
    pub outcome: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct BatchBody {
    pub notifications: Vec<NotificationRequest>,
}

/// POST /api/v1/notifications
///
/// A user without a linked chat is not an error: the response reports
/// `delivered: false` with outcome `not_linked`.
pub async fn send_notification(
    RequireService(caller): RequireService,
    State(state): State<AppState>,
    Json(request): Json<NotificationRequest>,
) -> AppResult<Json<DataResponse<SendResult>>> {
    let outcome = state
        .services
        .dispatcher
        .send_in_tenant(&caller.tenant_id, &request.user_id, request.kind, &request.payload)
        .await;

    let outcome_name = match outcome {
        DeliveryOutcome::Sent => "sent",
        DeliveryOutcome::NotLinked => "not_linked",
        DeliveryOutcome::Failed => "failed",
    };
    Ok(Json(DataResponse {
        data: SendResult {
            delivered: outcome == DeliveryOutcome::Sent,
            outcome: outcome_name,
        },
    }))
}

/// POST /api/v1/notifications/batch
pub async fn send_batch(
    RequireService(caller): RequireService,
    State(state): State<AppState>,
    Json(body): Json<BatchBody>,
) -> AppResult<Json<DataResponse<BatchReport>>> {
    if body.notifications.len() > MAX_BATCH_SIZE {
        return Err(AppError::BadRequest(format!(
            "At most {MAX_BATCH_SIZE} notifications per batch"
        )));
    }

    let report = state
        .services
        .dispatcher
        .send_batch(Some(&caller.tenant_id), &body.notifications)
        .await;
    Ok(Json(DataResponse { data: report }))
}
