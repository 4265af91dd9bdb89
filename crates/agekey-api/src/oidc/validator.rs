use std::{collections::BTreeMap, str::FromStr};

use openidconnect::{
    AdditionalClaims, IdToken, Nonce,
    core::{CoreGenderClaim, CoreJweContentEncryptionAlgorithm, CoreJwsSigningAlgorithm},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{AgeKeyClient, Flow, PendingSignin};

/// Threshold label (e.g. `"18"`) to whether the subject met it.
pub type AgeThresholds = BTreeMap<String, bool>;

/// Claims AgeKey adds on top of the standard ID token claims.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeKeyClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_thresholds: Option<AgeThresholds>,
}

impl AdditionalClaims for AgeKeyClaims {}

pub type AgeKeyIdToken = IdToken<
    AgeKeyClaims,
    CoreGenderClaim,
    CoreJweContentEncryptionAlgorithm,
    CoreJwsSigningAlgorithm,
>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("No matching state found in storage")]
    NoMatchingState,
    #[error("No state in response")]
    MissingState,
    #[error("State does not match the signin request")]
    StateMismatch,
    #[error("Signin was started for the {0} flow")]
    FlowMismatch(Flow),
    #[error("Malformed id_token: {0}")]
    Malformed(String),
    #[error("{0}")]
    Claims(String),
}

/// Boundary between the callback and whatever proves an ID token genuine.
pub trait IdTokenValidator: Send + Sync {
    /// Check `id_token` returned with `state` against the signin that started
    /// the attempt, returning the AgeKey claims on success.
    fn validate(
        &self,
        id_token: &str,
        state: &str,
        expected: &PendingSignin,
    ) -> Result<AgeKeyClaims, TokenValidationError>;
}

/// Validates ID tokens with the `openidconnect` verifier: signature against the
/// authority's JWKS, issuer, audience, expiry and nonce.
#[derive(Clone, Debug)]
pub struct OidcTokenValidator {
    client: AgeKeyClient,
}

impl OidcTokenValidator {
    pub const fn new(client: AgeKeyClient) -> Self {
        Self { client }
    }
}

impl IdTokenValidator for OidcTokenValidator {
    fn validate(
        &self,
        id_token: &str,
        state: &str,
        expected: &PendingSignin,
    ) -> Result<AgeKeyClaims, TokenValidationError> {
        if expected.flow != Flow::Use {
            return Err(TokenValidationError::FlowMismatch(expected.flow));
        }

        if state != expected.state {
            return Err(TokenValidationError::StateMismatch);
        }

        let id_token = AgeKeyIdToken::from_str(id_token)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;

        let verifier = self.client.id_token_verifier();
        let claims = id_token
            .claims(&verifier, &Nonce::new(expected.nonce.clone()))
            .map_err(|e| TokenValidationError::Claims(e.to_string()))?;

        tracing::debug!(subject = %claims.subject().as_str(), "ID token verified");

        Ok(claims.additional_claims().clone())
    }
}
