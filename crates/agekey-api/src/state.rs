use std::sync::Arc;

use anyhow::Context;
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::{
    ApiConfig,
    callback::MissingCreatedFlag,
    config::{Environment, non_empty},
    oidc::{Flow, FlowClients, FlowConfigs, IdTokenValidator, OidcTokenValidator},
    pages::Templates,
    par::ParRelay,
};

#[derive(Clone)]
pub struct ApiState {
    pub clients: FlowClients,
    pub flows: FlowConfigs,
    pub relay: ParRelay,
    pub validator: Arc<dyn IdTokenValidator>,
    pub templates: Templates,
    pub cookie_key: Key,
    pub environment: Environment,
    pub configured: bool,
    pub signin_expiry_minutes: u32,
    pub missing_created_flag: MissingCreatedFlag,
}

impl ApiState {
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let http_client = http_client()?;
        let flows = FlowConfigs::new(&config);

        // Discover both AgeKey authorities
        let clients = FlowClients::discover(&flows, &http_client).await?;

        Self::with_clients(&config, clients, http_client)
    }

    /// Assemble the state around clients that are already built.
    pub fn with_clients(
        config: &ApiConfig,
        clients: FlowClients,
        http_client: reqwest::Client,
    ) -> anyhow::Result<Self> {
        let cookie_key = cookie_key(config.cookie_secret.as_deref())?;

        if !config.is_configured() {
            tracing::warn!("NEXT_PUBLIC_AGEKEY_CLIENT_ID is not set, flows are disabled");
        }

        let validator = OidcTokenValidator::new(clients.get(Flow::Use).clone());

        Ok(Self {
            flows: FlowConfigs::new(config),
            relay: ParRelay::new(http_client, config),
            validator: Arc::new(validator),
            templates: Templates::new().context("compiling page templates")?,
            cookie_key,
            environment: config.environment,
            configured: config.is_configured(),
            signin_expiry_minutes: config.signin_expiry_minutes,
            missing_created_flag: MissingCreatedFlag::from_required(config.require_created_flag),
            clients,
        })
    }
}

/// Client for talking to the authorities. Redirects are not followed.
pub fn http_client() -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("building HTTP client")?;

    Ok(client)
}

fn cookie_key(secret: Option<&str>) -> anyhow::Result<Key> {
    match non_empty(secret) {
        Some(secret) => Key::try_from(secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("COOKIE_SECRET must be at least 64 bytes: {e}")),
        None => {
            tracing::warn!("COOKIE_SECRET not set, signins will not survive a restart");
            Ok(Key::generate())
        }
    }
}

impl FromRef<ApiState> for Key {
    fn from_ref(state: &ApiState) -> Self {
        state.cookie_key.clone()
    }
}
