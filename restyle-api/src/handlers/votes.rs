use super::json_body;
use crate::extract::{client_ip, header_value, VoterIdentity, ADMIN_TOKEN_HEADER};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use restyle_app::domain::{PromptOverride, StyleVoteAggregate};
use restyle_app::infrastructure::security::InputSanitizer;
use restyle_app::AppContext;
use restyle_errors::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub filter_name: String,
    pub generation_id: String,
    pub is_positive: bool,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub recorded: bool,
}

#[derive(Debug, Serialize)]
pub struct VotedResponse {
    pub voted: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementStatus {
    pub needs_refinement: bool,
    pub vote_threshold: u32,
    pub negative_ratio_threshold: f64,
    pub aggregate: StyleVoteAggregate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePromptRequest {
    pub original_prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ActivePromptResponse {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRequest {
    pub original_prompt: String,
    pub refined_prompt: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub saved: bool,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub reset: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoRefineRequest {
    pub original_prompt: String,
    pub feedback_context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AutoRefineResponse {
    #[serde(rename = "override")]
    pub prompt_override: Option<PromptOverride>,
}

fn non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

pub async fn record_vote(
    State(ctx): State<AppContext>,
    VoterIdentity(identity): VoterIdentity,
    body: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<Json<VoteResponse>, AppError> {
    let request = json_body(body)?;
    let filter_name = InputSanitizer::validate_filter_name(&request.filter_name)?;
    non_empty("generationId", &request.generation_id)?;

    let recorded = ctx
        .feedback
        .record_vote(&identity, &filter_name, request.is_positive, &request.generation_id)
        .await;

    Ok(Json(VoteResponse { recorded }))
}

pub async fn has_voted(
    State(ctx): State<AppContext>,
    VoterIdentity(identity): VoterIdentity,
    Path((filter_name, generation_id)): Path<(String, String)>,
) -> Result<Json<VotedResponse>, AppError> {
    let filter_name = InputSanitizer::validate_filter_name(&filter_name)?;
    let voted = ctx
        .feedback
        .has_voted(&identity, &filter_name, &generation_id)
        .await;
    Ok(Json(VotedResponse { voted }))
}

pub async fn all_stats(State(ctx): State<AppContext>) -> Json<Vec<StyleVoteAggregate>> {
    Json(ctx.feedback.all_vote_stats().await)
}

/// Destructive feedback operations need `x-admin-token` to match `ADMIN_TOKEN`.
fn require_admin(ctx: &AppContext, headers: &HeaderMap) -> Result<(), AppError> {
    let expected = ctx
        .config
        .admin_token
        .as_deref()
        .ok_or_else(|| AppError::Configuration("ADMIN_TOKEN is not set".to_string()))?;
    if header_value(headers, ADMIN_TOKEN_HEADER).as_deref() != Some(expected) {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

pub async fn clear_all(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> Result<Json<ResetResponse>, AppError> {
    require_admin(&ctx, &headers)?;

    Ok(Json(ResetResponse {
        reset: ctx.feedback.clear_all_votes().await,
    }))
}

pub async fn filter_stats(
    State(ctx): State<AppContext>,
    Path(filter_name): Path<String>,
) -> Result<Json<StyleVoteAggregate>, AppError> {
    let filter_name = InputSanitizer::validate_filter_name(&filter_name)?;
    let tally = ctx
        .feedback
        .vote_stats(&filter_name)
        .await
        .unwrap_or_else(|| StyleVoteAggregate::empty(filter_name));
    Ok(Json(tally))
}

pub async fn reset_filter(
    State(ctx): State<AppContext>,
    Path(filter_name): Path<String>,
    headers: HeaderMap,
) -> Result<Json<ResetResponse>, AppError> {
    require_admin(&ctx, &headers)?;
    let filter_name = InputSanitizer::validate_filter_name(&filter_name)?;
    Ok(Json(ResetResponse {
        reset: ctx.feedback.reset_votes(&filter_name).await,
    }))
}

pub async fn refinement_status(
    State(ctx): State<AppContext>,
    Path(filter_name): Path<String>,
) -> Result<Json<RefinementStatus>, AppError> {
    let filter_name = InputSanitizer::validate_filter_name(&filter_name)?;
    let policy = ctx.feedback.policy();
    let aggregate = ctx
        .feedback
        .vote_stats(&filter_name)
        .await
        .unwrap_or_else(|| StyleVoteAggregate::empty(filter_name.as_str()));

    Ok(Json(RefinementStatus {
        needs_refinement: policy.needs_refinement(Some(&aggregate)),
        vote_threshold: policy.vote_threshold,
        negative_ratio_threshold: policy.negative_ratio_threshold,
        aggregate,
    }))
}

pub async fn active_prompt(
    State(ctx): State<AppContext>,
    Path(filter_name): Path<String>,
    body: Result<Json<ActivePromptRequest>, JsonRejection>,
) -> Result<Json<ActivePromptResponse>, AppError> {
    let request = json_body(body)?;
    let filter_name = InputSanitizer::validate_filter_name(&filter_name)?;

    let prompt = ctx
        .feedback
        .get_active_prompt(&filter_name, &request.original_prompt)
        .await;
    Ok(Json(ActivePromptResponse { prompt }))
}

pub async fn save_override(
    State(ctx): State<AppContext>,
    Path(filter_name): Path<String>,
    headers: HeaderMap,
    body: Result<Json<OverrideRequest>, JsonRejection>,
) -> Result<Json<SavedResponse>, AppError> {
    require_admin(&ctx, &headers)?;
    let request = json_body(body)?;
    let filter_name = InputSanitizer::validate_filter_name(&filter_name)?;
    non_empty("originalPrompt", &request.original_prompt)?;
    non_empty("refinedPrompt", &request.refined_prompt)?;

    let saved = ctx
        .feedback
        .save_prompt_override(
            &filter_name,
            &request.original_prompt,
            request.refined_prompt.trim(),
            &request.reason,
        )
        .await;
    Ok(Json(SavedResponse { saved }))
}

pub async fn auto_refine(
    State(ctx): State<AppContext>,
    Path(filter_name): Path<String>,
    headers: HeaderMap,
    body: Result<Json<AutoRefineRequest>, JsonRejection>,
) -> Result<Json<AutoRefineResponse>, AppError> {
    ctx.rate_limiter.check_rate_limit(client_ip(&headers))?;
    let request = json_body(body)?;
    let filter_name = InputSanitizer::validate_filter_name(&filter_name)?;
    non_empty("originalPrompt", &request.original_prompt)?;

    let prompt_override = ctx
        .auto_refine
        .run(&filter_name, &request.original_prompt, request.feedback_context)
        .await?;
    Ok(Json(AutoRefineResponse { prompt_override }))
}
