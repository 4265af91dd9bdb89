use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;

/// Body accepted by `POST /api/create-agekey-par`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParRequest {
    pub state: Option<String>,
}

impl ParRequest {
    /// Read the request body whatever its `Content-Type`.
    ///
    /// A body that is not JSON, or is JSON `null`, is a server error. Any other
    /// JSON value is accepted; only a non-empty string `state` field counts.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| ApiError::Internal(format!("Unreadable PAR request body: {e}")))?;

        let state = match value {
            Value::Null => {
                return Err(ApiError::Internal("PAR request body is null".to_string()));
            }
            Value::Object(mut fields) => match fields.remove("state") {
                Some(Value::String(state)) if !state.is_empty() => Some(state),
                _ => None,
            },
            _ => None,
        };

        Ok(Self { state })
    }
}

/// Body returned to the caller: only the reference, nothing else from upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParResponse {
    pub request_uri: String,
}

/// What the provider's `/par` endpoint answers with.
#[derive(Debug, Deserialize)]
pub struct UpstreamParResponse {
    pub request_uri: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgeEvidence {
    pub date_of_birth: String,
}

/// One entry of the `authorization_details` array sent with the PAR.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationMethod {
    pub method: String,
    pub age: AgeEvidence,
    pub verified_at: String,
    pub verification_id: Uuid,
}

impl VerificationMethod {
    /// Fixed document-scan evidence used by the demo.
    pub fn demo() -> Self {
        Self {
            method: "id_doc_scan".to_string(),
            age: AgeEvidence {
                date_of_birth: "2000-01-02".to_string(),
            },
            verified_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            verification_id: Uuid::now_v7(),
        }
    }
}
