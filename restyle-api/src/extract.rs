use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use restyle_app::domain::Identity;
use restyle_errors::AppError;
use std::net::{IpAddr, Ipv4Addr};

pub const BROWSER_ID_HEADER: &str = "x-browser-id";
pub const USER_ID_HEADER: &str = "x-user-id";
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";
const MAX_IDENTITY_LENGTH: usize = 200;

pub fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Client address for rate limiting: first `x-forwarded-for` hop, loopback
/// when absent.
pub fn client_ip(headers: &HeaderMap) -> IpAddr {
    header_value(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next().and_then(|ip| ip.trim().parse().ok()))
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// Voter identity from `x-browser-id` (required) and `x-user-id` (optional).
pub struct VoterIdentity(pub Identity);

impl<S> FromRequestParts<S> for VoterIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let browser_id = header_value(&parts.headers, BROWSER_ID_HEADER).ok_or_else(|| {
            AppError::Validation(format!("{BROWSER_ID_HEADER} header is required"))
        })?;
        let user_id = header_value(&parts.headers, USER_ID_HEADER);

        if browser_id.len() > MAX_IDENTITY_LENGTH
            || user_id.as_ref().is_some_and(|u| u.len() > MAX_IDENTITY_LENGTH)
        {
            return Err(AppError::Validation("identity header is too long".to_string()));
        }

        Ok(Self(Identity {
            user_id,
            browser_id,
        }))
    }
}
