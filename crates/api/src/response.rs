//! Shared response envelope for API handlers.
//!
//! App-facing responses use a `{ "data": ... }` envelope. The webhook
//! endpoint is the exception: it answers the platform with `{ "ok": true }`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: chats }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
