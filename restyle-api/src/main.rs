use restyle_api::build_app_router;
use restyle_app::{AppConfig, AppContext};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");
    let addr = config.bind_addr;

    let app_context = AppContext::from_config(config)
        .await
        .expect("Failed to initialise application context");

    let app = build_app_router(app_context.clone());

    tracing::info!("Listening on http://{}", addr);
    tracing::info!(
        "Rate limit: {}/min, {}/hour per client on generative endpoints",
        app_context.config.rate_limit_per_minute,
        app_context.config.rate_limit_per_hour
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
