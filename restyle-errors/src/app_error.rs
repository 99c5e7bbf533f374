use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("No image was produced")]
    NoImageProduced { reason: Option<String> },

    #[error("No refined prompt was produced")]
    NoRefinement,

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Server configuration error: {0}")]
    Configuration(String),

    #[error("Generative API error: {0}")]
    Upstream(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn user_message(&self) -> &str {
        match self {
            Self::Validation(msg) => msg,
            Self::Unauthorized => "You are not allowed to do that.",
            Self::NoImageProduced { .. } => "The model did not return an image. Try a different photo or style.",
            Self::NoRefinement => "The model did not return a refined prompt.",
            Self::RateLimited(msg) => msg,
            Self::Configuration(_) => "Server is not configured correctly.",
            Self::Upstream(_) => "The image service is unavailable. Try again later.",
            Self::Storage(_) => "Feedback storage is unavailable. Try again later.",
            Self::Internal(_) => "Something went wrong on the server. Try again later.",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::NoImageProduced { reason } => reason.as_deref(),
            _ => None,
        }
    }
}

#[cfg(feature = "http")]
mod http_impl {
    use super::AppError;
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::Json;

    #[derive(serde::Serialize)]
    struct ErrorResponse {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    }

    impl AppError {
        pub fn status_code(&self) -> StatusCode {
            match self {
                AppError::Validation(_) => StatusCode::BAD_REQUEST,
                AppError::Unauthorized => StatusCode::UNAUTHORIZED,
                AppError::NoImageProduced { .. } | AppError::NoRefinement => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                AppError::Configuration(_)
                | AppError::Upstream(_)
                | AppError::Storage(_)
                | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl IntoResponse for AppError {
        fn into_response(self) -> Response {
            let status = self.status_code();
            let body = ErrorResponse {
                message: self.user_message().to_string(),
                reason: self.reason().map(str::to_string),
            };
            (status, Json(body)).into_response()
        }
    }
}
