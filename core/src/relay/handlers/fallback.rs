use axum::http::StatusCode;

/// Anything that is neither a preflight nor `POST /heartbeat`.
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
