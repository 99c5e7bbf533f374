use super::json_body;
use crate::extract::client_ip;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use restyle_app::domain::{ImageFilterRequest, RefinementRequest};
use restyle_app::AppContext;
use restyle_errors::AppError;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFilterResponse {
    pub image_base64: String,
}

#[derive(Debug, Serialize)]
pub struct RefinePromptResponse {
    pub prompt: String,
}

pub async fn apply_image_filter(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    body: Result<Json<ImageFilterRequest>, JsonRejection>,
) -> Result<Json<ImageFilterResponse>, AppError> {
    ctx.rate_limiter.check_rate_limit(client_ip(&headers))?;
    let request = json_body(body)?;

    let image_base64 = ctx.apply_image_filter.execute(request).await.inspect_err(|e| {
        tracing::warn!("apply-image-filter failed: {}", e);
    })?;

    Ok(Json(ImageFilterResponse { image_base64 }))
}

pub async fn refine_prompt(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    body: Result<Json<RefinementRequest>, JsonRejection>,
) -> Result<Json<RefinePromptResponse>, AppError> {
    ctx.rate_limiter.check_rate_limit(client_ip(&headers))?;
    let request = json_body(body)?;

    let prompt = ctx.refine_prompt.execute(request).await.inspect_err(|e| {
        tracing::warn!("refine-prompt failed: {}", e);
    })?;

    Ok(Json(RefinePromptResponse { prompt }))
}
