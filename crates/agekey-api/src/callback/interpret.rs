use std::collections::HashMap;

use crate::oidc::{AgeThresholds, Flow, IdTokenValidator, PendingSignin, TokenValidationError};

/// Query parameters the identity provider may append to the redirect URI.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackQuery {
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub id_token: Option<String>,
    pub state: Option<String>,
    pub agekey_created: Option<String>,
}

impl CallbackQuery {
    /// Read a raw query string the way the browser's `URLSearchParams` does:
    /// the first occurrence of a key wins. Empty values are treated as absent,
    /// except for `agekey_created` which is matched literally.
    pub fn parse(raw: &str) -> Self {
        let mut first: HashMap<String, String> = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            first
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }

        let mut present = |name: &str| first.remove(name).filter(|v| !v.is_empty());

        Self {
            error: present("error"),
            error_description: present("error_description"),
            id_token: present("id_token"),
            state: present("state"),
            agekey_created: first.remove("agekey_created"),
        }
    }
}

/// What to conclude when a create callback carries no `agekey_created` flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingCreatedFlag {
    /// Older provider deployments never sent the flag.
    #[default]
    AssumeCreated,
    AssumeNotCompleted,
}

impl MissingCreatedFlag {
    pub const fn from_required(required: bool) -> Self {
        if required {
            Self::AssumeNotCompleted
        } else {
            Self::AssumeCreated
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackResult {
    Succeeded {
        flow: Flow,
        message: String,
        age_thresholds: Option<AgeThresholds>,
    },
    Failed {
        /// `None` when the response does not reveal which flow it answers.
        flow: Option<Flow>,
        message: String,
    },
}

/// How the callback page presents a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    NotCompleted,
    Error,
}

impl Outcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NotCompleted => "not_completed",
            Self::Error => "error",
        }
    }
}

impl CallbackResult {
    pub fn failed(flow: Option<Flow>, message: impl Into<String>) -> Self {
        Self::Failed {
            flow,
            message: message.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub const fn flow(&self) -> Option<Flow> {
        match self {
            Self::Succeeded { flow, .. } => Some(*flow),
            Self::Failed { flow, .. } => *flow,
        }
    }

    pub fn flow_label(&self) -> &'static str {
        self.flow().map_or("unknown", Flow::as_str)
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Succeeded { message, .. } | Self::Failed { message, .. } => message,
        }
    }

    pub const fn age_thresholds(&self) -> Option<&AgeThresholds> {
        match self {
            Self::Succeeded { age_thresholds, .. } => age_thresholds.as_ref(),
            Self::Failed { .. } => None,
        }
    }

    /// A failed create flow means the user stopped before finishing, which
    /// is shown as "not completed" rather than as an error.
    pub const fn outcome(&self) -> Outcome {
        match self {
            Self::Succeeded { .. } => Outcome::Success,
            Self::Failed {
                flow: Some(Flow::Create),
                ..
            } => Outcome::NotCompleted,
            Self::Failed { .. } => Outcome::Error,
        }
    }
}

const NOT_COMPLETED: &str = "AgeKey creation was not completed. This may happen if you canceled the process or if there was an issue during age verification.";

/// Decide what a callback means.
///
/// Depends only on its arguments: the same query and pending signin always
/// produce the same result.
pub fn interpret<V>(
    query: &CallbackQuery,
    pending: Option<&PendingSignin>,
    validator: &V,
    missing_flag: MissingCreatedFlag,
) -> CallbackResult
where
    V: IdTokenValidator + ?Sized,
{
    if let Some(error) = &query.error {
        tracing::warn!(%error, description = ?query.error_description, "AgeKey returned an error");

        let message = match &query.error_description {
            Some(description) => format!("AgeKey flow failed: {error} ({description})"),
            None => format!("AgeKey flow failed: {error}"),
        };
        return CallbackResult::failed(None, message);
    }

    match &query.id_token {
        Some(id_token) => interpret_use(id_token, query.state.as_deref(), pending, validator),
        None => interpret_create(query.agekey_created.as_deref(), missing_flag),
    }
}

fn interpret_use<V>(
    id_token: &str,
    state: Option<&str>,
    pending: Option<&PendingSignin>,
    validator: &V,
) -> CallbackResult
where
    V: IdTokenValidator + ?Sized,
{
    let validated = state
        .ok_or(TokenValidationError::MissingState)
        .and_then(|state| {
            let pending = pending.ok_or(TokenValidationError::NoMatchingState)?;
            validator.validate(id_token, state, pending)
        });

    match validated {
        Ok(claims) => {
            tracing::info!(age_thresholds = ?claims.age_thresholds, "Use AgeKey flow completed");
            CallbackResult::Succeeded {
                flow: Flow::Use,
                message: "Age verification completed successfully!".to_string(),
                age_thresholds: claims.age_thresholds,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Use AgeKey callback rejected");
            CallbackResult::failed(Some(Flow::Use), format!("Authentication failed: {e}"))
        }
    }
}

fn interpret_create(agekey_created: Option<&str>, missing_flag: MissingCreatedFlag) -> CallbackResult {
    match agekey_created {
        Some("true") => {
            tracing::info!("AgeKey created");
            CallbackResult::Succeeded {
                flow: Flow::Create,
                message: "AgeKey created successfully!".to_string(),
                age_thresholds: None,
            }
        }
        Some("false") => {
            tracing::info!("AgeKey creation was not completed");
            CallbackResult::failed(Some(Flow::Create), NOT_COMPLETED)
        }
        other => {
            tracing::warn!(
                agekey_created = ?other,
                policy = ?missing_flag,
                "Create callback without a recognised agekey_created flag"
            );
            match missing_flag {
                MissingCreatedFlag::AssumeCreated => CallbackResult::Succeeded {
                    flow: Flow::Create,
                    message: "AgeKey creation process completed!".to_string(),
                    age_thresholds: None,
                },
                MissingCreatedFlag::AssumeNotCompleted => CallbackResult::failed(
                    Some(Flow::Create),
                    "AgeKey creation was not completed: the provider did not report an outcome.",
                ),
            }
        }
    }
}
