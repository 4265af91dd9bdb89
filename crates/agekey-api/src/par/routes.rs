use axum::{Json, Router, body::Bytes, extract::State, routing::post};

use super::models::{ParRequest, ParResponse};
use crate::{ApiState, error::ApiError};

pub fn routes() -> Router<ApiState> {
    Router::new().route("/api/create-agekey-par", post(create_agekey_par))
}

async fn create_agekey_par(
    State(state): State<ApiState>,
    body: Bytes,
) -> Result<Json<ParResponse>, ApiError> {
    let signin_state = ParRequest::from_body(&body)?
        .state
        .ok_or_else(|| ApiError::Validation("Missing state".to_string()))?;

    let response = state.relay.push(&signin_state).await?;

    Ok(Json(response))
}
