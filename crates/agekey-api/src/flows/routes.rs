use axum::{Router, extract::State, response::Redirect, routing::post};
use axum_extra::extract::PrivateCookieJar;

use super::service::{self, FlowError};
use crate::{ApiState, cookies, oidc::SigninRequest};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/flows/use", post(use_agekey))
        .route("/flows/create", post(create_agekey))
}

async fn use_agekey(
    State(state): State<ApiState>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Redirect), FlowError> {
    let request = service::start_use(&state)?;
    redirect(&state, jar, &request)
}

async fn create_agekey(
    State(state): State<ApiState>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Redirect), FlowError> {
    let request = service::start_create(&state).await?;
    redirect(&state, jar, &request)
}

/// Remember the attempt in the signin cookie and send the browser to the authority.
fn redirect(
    state: &ApiState,
    jar: PrivateCookieJar,
    request: &SigninRequest,
) -> Result<(PrivateCookieJar, Redirect), FlowError> {
    let cookie = cookies::create_signin_cookie(
        &request.pending,
        &state.environment,
        state.signin_expiry_minutes,
    )?;

    Ok((jar.add(cookie), Redirect::to(request.url.as_str())))
}
