use crate::cors;
use crate::handlers::{health, preflight, proxy, votes};
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use restyle_app::AppContext;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

/// Full application router; used by the binary and by the integration tests.
pub fn build_app_router(ctx: AppContext) -> Router {
    let body_limit = ctx.config.max_body_bytes;

    Router::new()
        .route("/health", get(health::health))
        // Generative proxies
        .route(
            "/api/apply-image-filter",
            post(proxy::apply_image_filter).options(preflight),
        )
        .route(
            "/api/refine-prompt",
            post(proxy::refine_prompt).options(preflight),
        )
        // Feedback
        .route(
            "/api/votes",
            post(votes::record_vote)
                .get(votes::all_stats)
                .delete(votes::clear_all)
                .options(preflight),
        )
        .route(
            "/api/filters/{filter_name}/votes",
            get(votes::filter_stats)
                .delete(votes::reset_filter)
                .options(preflight),
        )
        .route(
            "/api/filters/{filter_name}/votes/{generation_id}",
            get(votes::has_voted).options(preflight),
        )
        .route(
            "/api/filters/{filter_name}/refinement",
            get(votes::refinement_status).options(preflight),
        )
        .route(
            "/api/filters/{filter_name}/active-prompt",
            post(votes::active_prompt).options(preflight),
        )
        .route(
            "/api/filters/{filter_name}/override",
            put(votes::save_override).options(preflight),
        )
        .route(
            "/api/filters/{filter_name}/auto-refine",
            post(votes::auto_refine).options(preflight),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn_with_state(ctx.clone(), cors::cors))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
