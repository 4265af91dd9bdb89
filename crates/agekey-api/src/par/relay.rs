use openidconnect::{ClientId, ClientSecret};

use super::models::{ParResponse, UpstreamParResponse, VerificationMethod};
use crate::{
    config::{ApiConfig, non_empty},
    error::ApiError,
    metrics,
};

/// Forwards pushed authorization requests to the create authority.
///
/// Credentials are optional here on purpose: a relay with missing credentials
/// still starts, and every call answers with a configuration error.
#[derive(Clone, Debug)]
pub struct ParRelay {
    http_client: reqwest::Client,
    issuer: String,
    client_id: Option<ClientId>,
    client_secret: Option<ClientSecret>,
    redirect_uri: Option<String>,
}

impl ParRelay {
    pub fn new(http_client: reqwest::Client, config: &ApiConfig) -> Self {
        Self {
            http_client,
            issuer: config.create_issuer().to_string(),
            client_id: non_empty(config.client_id.as_deref()).map(|id| ClientId::new(id.to_string())),
            client_secret: non_empty(config.client_secret.as_deref())
                .map(|secret| ClientSecret::new(secret.to_string())),
            redirect_uri: non_empty(config.redirect_uri.as_deref()).map(str::to_string),
        }
    }

    /// `<issuer>/par`, ignoring any trailing slashes on the issuer.
    pub fn endpoint(&self) -> String {
        format!("{}/par", self.issuer.trim_end_matches('/'))
    }

    /// Register an authorization request for `state` and return its reference.
    ///
    /// Single attempt, no retry.
    #[tracing::instrument(skip(self), fields(endpoint = %self.endpoint()))]
    pub async fn push(&self, state: &str) -> Result<ParResponse, ApiError> {
        let result = self.send(state).await;
        metrics::record_par_request(&result);
        result
    }

    async fn send(&self, state: &str) -> Result<ParResponse, ApiError> {
        if state.is_empty() {
            return Err(ApiError::Validation("Missing state".to_string()));
        }

        let (Some(client_id), Some(client_secret), Some(redirect_uri)) = (
            self.client_id.as_ref(),
            self.client_secret.as_ref(),
            self.redirect_uri.as_deref(),
        ) else {
            return Err(ApiError::Configuration(
                "Server is missing env configuration".to_string(),
            ));
        };

        let authorization_details = serde_json::to_string(&[VerificationMethod::demo()])
            .map_err(|e| ApiError::Internal(format!("Failed to encode authorization details: {e}")))?;

        let form = [
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.secret().as_str()),
            ("scope", "openid"),
            ("response_type", "none"),
            ("redirect_uri", redirect_uri),
            ("state", state),
            ("authorization_details", authorization_details.as_str()),
        ];

        let response = self
            .http_client
            .post(self.endpoint())
            .form(&form)
            .send()
            .await
            .map_err(|e| ApiError::Internal(format!("PAR request could not be sent: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream { status, details });
        }

        let body: UpstreamParResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Internal(format!("Invalid PAR response: {e}")))?;

        tracing::info!(expires_in = ?body.expires_in, "Pushed authorization request registered");

        Ok(ParResponse {
            request_uri: body.request_uri,
        })
    }
}
