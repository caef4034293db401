use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chatlink_bot::BotError;
use chatlink_core::error::CoreError;
use chatlink_db::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors, the bot and store errors that
/// bubble up through handlers, and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `chatlink_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Bot(#[from] BotError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) | AppError::Bot(BotError::Domain(core)) => classify_core_error(core),

            AppError::Store(err) | AppError::Bot(BotError::DownstreamFetchFailure(err)) => {
                classify_store_error(err)
            }

            AppError::Bot(BotError::TransportSendFailure(err)) => {
                tracing::error!(error = %err, "Transport error");
                (
                    StatusCode::BAD_GATEWAY,
                    "TRANSPORT_ERROR",
                    "The messaging platform could not be reached".to_string(),
                )
            }

            AppError::Bot(err @ BotError::CodeSpaceExhausted { .. }) => {
                tracing::error!(error = %err, "Linking code generation failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "CODE_GENERATION_FAILED",
                    "Could not generate a linking code, please retry".to_string(),
                )
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn classify_core_error(core: &CoreError) -> (StatusCode, &'static str, String) {
    match core {
        CoreError::InvalidOrExpiredCode => (
            StatusCode::BAD_REQUEST,
            "INVALID_CODE",
            core.to_string(),
        ),
        CoreError::NotLinked { .. } => (StatusCode::NOT_FOUND, "NOT_LINKED", core.to_string()),
        CoreError::TenantMissing { .. } => {
            (StatusCode::NOT_FOUND, "TENANT_MISSING", core.to_string())
        }
        CoreError::AlreadyLinked { .. } => {
            (StatusCode::CONFLICT, "ALREADY_LINKED", core.to_string())
        }
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

/// Store failures never leak details to the client.
///
/// - `Unavailable` maps to 503.
/// - `RowNotFound` maps to 404.
/// - Everything else maps to 500 with a sanitized message.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::Unavailable(detail) => {
            tracing::error!(detail = %detail, "Store unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "STORE_UNAVAILABLE",
                "Storage is temporarily unavailable".to_string(),
            )
        }
        StoreError::Database(sqlx::Error::RowNotFound) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn domain_errors_map_to_client_statuses() {
        assert_eq!(status_of(CoreError::InvalidOrExpiredCode.into()), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(BotError::from(CoreError::AlreadyLinked { external_id: 1 }).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CoreError::Forbidden("no".into()).into()),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn store_outage_is_503() {
        let err = AppError::from(BotError::from(StoreError::Unavailable("down".into())));
        assert_eq!(status_of(err), StatusCode::SERVICE_UNAVAILABLE);
    }
}
