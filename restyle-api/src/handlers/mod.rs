pub mod health;
pub mod proxy;
pub mod votes;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use restyle_errors::AppError;

/// CORS preflight: empty 200, headers are added by the CORS middleware.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Undecodable or mistyped JSON is a 400, not axum's default 422.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}
