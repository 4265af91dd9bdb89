use axum::{Router, http::StatusCode, response::IntoResponse, routing::get};

use crate::{callback, flows, pages, par, state::ApiState};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/health", get(health))
        .merge(pages::routes())
        .merge(flows::routes())
        .merge(par::routes())
        .merge(callback::routes())
        .fallback(handler_404)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}
