use anyhow::Context;
use oauth2::{EndpointNotSet, EndpointSet};
use openidconnect::{
    AuthUrl, ClientId, IssuerUrl, RedirectUrl,
    core::{CoreClient, CoreJsonWebKeySet, CoreProviderMetadata},
};

use super::flow::{Flow, FlowConfig, FlowConfigs};

/// OIDC client that only knows the authorization endpoint and the provider's
/// signing keys. Neither flow talks to a token or userinfo endpoint.
pub type AgeKeyClient = CoreClient<
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
>;

/// Build a client from already known provider details
pub fn build_client(
    config: &FlowConfig,
    issuer: IssuerUrl,
    auth_url: AuthUrl,
    jwks: CoreJsonWebKeySet,
) -> Result<AgeKeyClient, url::ParseError> {
    let client = CoreClient::new(ClientId::new(config.client_id.clone()), issuer, jwks)
        .set_auth_uri(auth_url)
        .set_redirect_uri(RedirectUrl::new(config.redirect_uri.clone())?);

    Ok(client)
}

/// Discover the authority's OIDC configuration and create a client for it
pub async fn discover_client(
    config: &FlowConfig,
    http_client: &reqwest::Client,
) -> anyhow::Result<AgeKeyClient> {
    let provider_metadata = CoreProviderMetadata::discover_async(
        IssuerUrl::new(config.authority.clone())?,
        http_client,
    )
    .await
    .with_context(|| format!("discovering the {} authority {}", config.flow, config.authority))?;

    tracing::info!(
        flow = %config.flow,
        authority = %config.authority,
        authorization_endpoint = %provider_metadata.authorization_endpoint().as_str(),
        "Discovered AgeKey authority"
    );

    let client = build_client(
        config,
        provider_metadata.issuer().clone(),
        provider_metadata.authorization_endpoint().clone(),
        provider_metadata.jwks().clone(),
    )?;

    Ok(client)
}

/// One client per flow, each bound to its own authority.
#[derive(Clone, Debug)]
pub struct FlowClients {
    use_client: AgeKeyClient,
    create_client: AgeKeyClient,
}

impl FlowClients {
    pub const fn new(use_client: AgeKeyClient, create_client: AgeKeyClient) -> Self {
        Self {
            use_client,
            create_client,
        }
    }

    pub async fn discover(
        configs: &FlowConfigs,
        http_client: &reqwest::Client,
    ) -> anyhow::Result<Self> {
        let (use_client, create_client) = tokio::try_join!(
            discover_client(configs.get(Flow::Use), http_client),
            discover_client(configs.get(Flow::Create), http_client),
        )?;

        Ok(Self::new(use_client, create_client))
    }

    pub const fn get(&self, flow: Flow) -> &AgeKeyClient {
        match flow {
            Flow::Use => &self.use_client,
            Flow::Create => &self.create_client,
        }
    }
}
