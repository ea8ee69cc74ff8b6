//! Permissive cross-origin handling
//!
//! Browsers hosting the time-tracking client call the relay cross-origin, so
//! every response allows any origin and every `OPTIONS` request, on any
//! path, is answered as a preflight without reaching the router.

use axum::{
    extract::Request,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::set_header::SetResponseHeaderLayer;

/// Answer `OPTIONS` requests directly, pass everything else on.
pub async fn preflight(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        tracing::debug!(path = %request.uri().path(), "CORS preflight");
        return preflight_response();
    }
    next.run(request).await
}

pub fn preflight_response() -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
            (ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST, OPTIONS")),
            (ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*")),
        ],
    )
        .into_response()
}

/// Sets `Access-Control-Allow-Origin: *` on every response, replacing any
/// value relayed from upstream.
pub fn allow_any_origin() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"))
}
