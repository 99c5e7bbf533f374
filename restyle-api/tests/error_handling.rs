use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use restyle_errors::AppError;
use serde_json::Value;

async fn render(error: AppError) -> (StatusCode, Value) {
    let response = error.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn validation_error_is_400_with_message() {
    let (status, json) = render(AppError::Validation("prompt is required".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "prompt is required");
    assert!(json.get("reason").is_none());
}

#[tokio::test]
async fn missing_image_carries_model_reason() {
    let (status, json) = render(AppError::NoImageProduced {
        reason: Some("SAFETY".into()),
    })
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["reason"], "SAFETY");
}

#[tokio::test]
async fn internal_details_are_not_leaked() {
    for error in [
        AppError::Configuration("GEMINI_API_KEY missing".into()),
        AppError::Upstream("HTTP 503 from upstream".into()),
        AppError::Storage("connection refused".into()),
        AppError::Internal("panic".into()),
    ] {
        let detail = error.to_string();
        let (status, json) = render(error).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!detail.contains(json["message"].as_str().unwrap()));
    }
}

#[test]
fn status_codes_cover_client_errors() {
    assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::NoRefinement.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        AppError::RateLimited("slow down".into()).status_code(),
        StatusCode::TOO_MANY_REQUESTS
    );
}
