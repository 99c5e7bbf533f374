use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, ORIGIN, VARY,
};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use restyle_app::AppContext;

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "content-type, authorization, x-browser-id, x-user-id, x-admin-token";

/// Echoes the request origin when it is allowed (or the list is `*`),
/// otherwise the first configured origin. Always varies on `Origin`.
pub fn resolve_allowed_origin(allowed: &[String], origin: Option<&str>) -> String {
    let wildcard = allowed.iter().any(|o| o == "*");
    match origin {
        Some(origin) if wildcard || allowed.iter().any(|o| o == origin) => origin.to_string(),
        _ => allowed.first().cloned().unwrap_or_else(|| "*".to_string()),
    }
}

pub async fn cors(State(ctx): State<AppContext>, request: Request, next: Next) -> Response {
    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut response = next.run(request).await;

    let allow_origin = resolve_allowed_origin(&ctx.config.allowed_origins, origin.as_deref());
    let headers = response.headers_mut();
    match HeaderValue::from_str(&allow_origin) {
        Ok(value) => {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
        Err(_) => tracing::warn!("Configured origin {:?} is not a valid header value", allow_origin),
    }
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
    headers.append(VARY, HeaderValue::from_static("Origin"));

    response
}
