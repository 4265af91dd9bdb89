use agekey_api::{
    config::ApiConfig,
    metrics::{init_metrics, metrics_handler, track_metrics},
    middleware::{apply_security_headers, request_id_middleware},
    state::ApiState,
    tracing::init_tracing,
};
use axum::{Router, extract::Request, middleware, routing::get};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from .env.local, then .env, then the environment
    dotenvy::from_filename(".env.local").ok();
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    init_tracing(&config.environment);

    let metrics_handle = init_metrics()?;
    let metrics_app = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    let port = config.port;
    let environment = config.environment;
    let state = ApiState::new(config).await?;

    let app = agekey_api::router::router()
        .with_state(state)
        .merge(metrics_app)
        .layer(
            // Paths only: callback query strings carry the id_token
            TraceLayer::new_for_http().make_span_with(|req: &Request| {
                tracing::info_span!("http", method = %req.method(), path = %req.uri().path())
            }),
        )
        .layer(middleware::from_fn(track_metrics))
        .layer(middleware::from_fn(request_id_middleware));
    let app = apply_security_headers(app, environment);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Server running on http://localhost:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}
