use axum::response::{IntoResponse, Redirect, Response};
use serde_json::json;
use thiserror::Error;

use crate::{
    ApiState,
    error::ApiError,
    oidc::{
        Flow, SigninRequest,
        signin::{self, create_signin_request},
    },
};

/// Thresholds the demo asks AgeKey to evaluate.
pub const AGE_THRESHOLDS: [u8; 2] = [13, 18];

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("AgeKey client is not configured")]
    NotConfigured,
    #[error("No state found in signin request")]
    StateExtraction,
    #[error("Failed to submit PAR request: {0}")]
    Relay(#[source] ApiError),
    #[error("Failed to store signin state: {0}")]
    SigninCookie(#[from] serde_json::Error),
}

/// Initiation failures are not shown to the user: log and go back to the idle page.
impl IntoResponse for FlowError {
    fn into_response(self) -> Response {
        match &self {
            Self::NotConfigured => tracing::warn!("Ignoring flow start: {}", self),
            _ => tracing::error!("Error starting AgeKey flow: {}", self),
        }

        Redirect::to("/").into_response()
    }
}

/// The `claims` request parameter asking for age-threshold results.
pub fn age_threshold_claims() -> String {
    json!({ "age_thresholds": AGE_THRESHOLDS }).to_string()
}

/// Build the "Use AgeKey" authorization request.
pub fn start_use(state: &ApiState) -> Result<SigninRequest, FlowError> {
    if !state.configured {
        return Err(FlowError::NotConfigured);
    }

    let request = create_signin_request(
        state.clients.get(Flow::Use),
        state.flows.get(Flow::Use),
        vec![("claims", age_threshold_claims())],
    );

    tracing::info!(state = %request.pending.state, "Starting Use AgeKey flow");

    Ok(request)
}

/// Register the "Create AgeKey" request with the provider, then build the
/// authorization request pointing at it.
///
/// Fails closed: nothing is returned unless every step succeeded.
pub async fn start_create(state: &ApiState) -> Result<SigninRequest, FlowError> {
    if !state.configured {
        return Err(FlowError::NotConfigured);
    }

    let client = state.clients.get(Flow::Create);
    let config = state.flows.get(Flow::Create);

    let draft = create_signin_request(client, config, Vec::new());
    let signin_state = signin::state_param(&draft.url).ok_or(FlowError::StateExtraction)?;

    let par = state
        .relay
        .push(&signin_state)
        .await
        .map_err(FlowError::Relay)?;

    let mut pending = draft.pending;
    pending.state = signin_state;

    let url = signin::authorization_url(
        client,
        config,
        &pending,
        vec![("request_uri", par.request_uri)],
    );

    tracing::info!(state = %pending.state, "Starting Create AgeKey flow");

    Ok(SigninRequest { url, pending })
}
