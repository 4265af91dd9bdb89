use axum::{
    Router,
    extract::{RawQuery, State},
    response::Html,
    routing::get,
};
use axum_extra::extract::PrivateCookieJar;

use super::{CallbackQuery, CallbackView, interpret};
use crate::{ApiState, cookies, error::ApiError, metrics};

pub fn routes() -> Router<ApiState> {
    Router::new().route("/callback", get(callback))
}

#[tracing::instrument(skip_all)]
async fn callback(
    State(state): State<ApiState>,
    jar: PrivateCookieJar,
    RawQuery(query): RawQuery,
) -> Result<(PrivateCookieJar, Html<String>), ApiError> {
    let pending = cookies::pending_signin(&jar);

    let query = CallbackQuery::parse(query.as_deref().unwrap_or_default());
    let result = interpret(
        &query,
        pending.as_ref(),
        state.validator.as_ref(),
        state.missing_created_flag,
    );

    metrics::record_callback(&result);

    // The signin is consumed whatever the outcome
    let jar = jar.remove(cookies::removal_cookie());

    let page = state
        .templates
        .render("callback.html", CallbackView::from(&result))?;

    Ok((jar, page))
}
