//! Building authorization requests and tracking the attempt they belong to.

use openidconnect::{CsrfToken, Nonce};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{AgeKeyClient, Flow, FlowConfig};

/// Correlation data for one authorization attempt, kept in the signin cookie
/// until the callback consumes it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSignin {
    pub flow: Flow,
    pub state: String,
    pub nonce: String,
}

#[derive(Clone, Debug)]
pub struct SigninRequest {
    pub url: Url,
    pub pending: PendingSignin,
}

/// Generate a fresh state carrying the flow name, e.g. `use.Xk3...`.
pub fn new_state(flow: Flow) -> CsrfToken {
    CsrfToken::new(format!("{flow}.{}", CsrfToken::new_random().secret()))
}

/// Recover the flow a state was generated for.
pub fn flow_of_state(state: &str) -> Option<Flow> {
    state.split_once('.')?.0.parse().ok()
}

/// Read the `state` query parameter back out of an authorization URL.
pub fn state_param(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
}

/// Build an authorization request with a new state and nonce.
pub fn create_signin_request(
    client: &AgeKeyClient,
    config: &FlowConfig,
    extra_params: Vec<(&'static str, String)>,
) -> SigninRequest {
    let state = new_state(config.flow);
    let nonce = Nonce::new_random();

    let pending = PendingSignin {
        flow: config.flow,
        state: state.secret().clone(),
        nonce: nonce.secret().clone(),
    };

    let url = authorization_url(client, config, &pending, extra_params);

    SigninRequest { url, pending }
}

/// Build the authorization URL for an attempt that already has its state and
/// nonce, e.g. once the pushed request has been registered.
pub fn authorization_url(
    client: &AgeKeyClient,
    config: &FlowConfig,
    pending: &PendingSignin,
    extra_params: Vec<(&'static str, String)>,
) -> Url {
    let state = CsrfToken::new(pending.state.clone());
    let nonce = Nonce::new(pending.nonce.clone());

    let mut request = client
        .authorize_url(
            config.authentication_flow(),
            move || state,
            move || nonce,
        )
        .add_extra_param("response_mode", config.response_mode);

    for (name, value) in extra_params {
        request = request.add_extra_param(name, value);
    }

    let (url, _, _) = request.url();
    url
}
