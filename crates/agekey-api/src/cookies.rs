use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};

use crate::{config::Environment, oidc::PendingSignin};

/// Name of the encrypted cookie correlating a signin with its callback
pub const SIGNIN_COOKIE: &str = "agekey_signin";

/// Create the signin cookie for an authorization attempt
///
/// The callback arrives as a top-level navigation from the identity provider,
/// so the cookie must be `SameSite=Lax`. It is secure (HTTPS-only) outside
/// development.
pub fn create_signin_cookie(
    pending: &PendingSignin,
    environment: &Environment,
    expiry_minutes: u32,
) -> Result<Cookie<'static>, serde_json::Error> {
    let value = serde_json::to_string(pending)?;

    Ok(Cookie::build((SIGNIN_COOKIE, value))
        .path("/")
        .max_age(time::Duration::minutes(i64::from(expiry_minutes)))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(!environment.is_development())
        .build())
}

/// Read the pending signin back, if the jar holds a readable one
pub fn pending_signin(jar: &PrivateCookieJar) -> Option<PendingSignin> {
    let cookie = jar.get(SIGNIN_COOKIE)?;

    match serde_json::from_str(cookie.value()) {
        Ok(pending) => Some(pending),
        Err(e) => {
            tracing::warn!("Ignoring unreadable signin cookie: {e}");
            None
        }
    }
}

/// Cookie used to drop the signin cookie once it has been consumed
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SIGNIN_COOKIE).path("/").build()
}
