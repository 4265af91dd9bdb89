use std::fmt;

use openidconnect::{AuthenticationFlow, core::CoreResponseType};
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;

/// The two AgeKey journeys the demo can start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    /// Present an existing AgeKey and receive age-threshold claims.
    Use,
    /// Issue a new AgeKey through a pushed authorization request.
    Create,
}

impl Flow {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Use => "use",
            Self::Create => "create",
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Flow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "use" => Ok(Self::Use),
            "create" => Ok(Self::Create),
            other => Err(format!("unknown flow '{other}'")),
        }
    }
}

/// Per-flow client settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowConfig {
    pub flow: Flow,
    pub authority: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub response_type: &'static str,
    pub response_mode: &'static str,
    pub scope: &'static str,
}

impl FlowConfig {
    pub fn new(flow: Flow, config: &ApiConfig) -> Self {
        let (authority, response_type) = match flow {
            Flow::Use => (config.use_issuer(), "id_token"),
            // Nothing comes back from creation except a status flag on the callback.
            Flow::Create => (config.create_issuer(), "none"),
        };

        Self {
            flow,
            authority: authority.to_string(),
            client_id: config.flow_client_id().to_string(),
            redirect_uri: config.flow_redirect_uri().to_string(),
            response_type,
            response_mode: "query",
            scope: "openid",
        }
    }

    pub fn authentication_flow(&self) -> AuthenticationFlow<CoreResponseType> {
        match self.flow {
            Flow::Use => AuthenticationFlow::Implicit(false),
            Flow::Create => AuthenticationFlow::Hybrid(vec![CoreResponseType::None]),
        }
    }
}

/// Settings for both flows, built once from the process configuration.
#[derive(Clone, Debug)]
pub struct FlowConfigs {
    use_config: FlowConfig,
    create_config: FlowConfig,
}

impl FlowConfigs {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            use_config: FlowConfig::new(Flow::Use, config),
            create_config: FlowConfig::new(Flow::Create, config),
        }
    }

    pub const fn get(&self, flow: Flow) -> &FlowConfig {
        match flow {
            Flow::Use => &self.use_config,
            Flow::Create => &self.create_config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_round_trips_through_str() {
        for flow in [Flow::Use, Flow::Create] {
            assert_eq!(flow.as_str().parse::<Flow>().unwrap(), flow);
        }
        assert!("unknown".parse::<Flow>().is_err());
    }

    #[test]
    fn test_flow_configs_from_defaults() {
        let config = ApiConfig::from_vars(Vec::new()).unwrap();

        let use_config = FlowConfig::new(Flow::Use, &config);
        assert_eq!(use_config.authority, "https://api.agekey.org/v1/oidc/use");
        assert_eq!(use_config.response_type, "id_token");
        assert_eq!(use_config.response_mode, "query");
        assert_eq!(use_config.scope, "openid");
        assert_eq!(use_config.redirect_uri, "http://localhost:3000/callback");

        let create_config = FlowConfig::new(Flow::Create, &config);
        assert_eq!(create_config.authority, "https://api.agekey.org/v1/oidc/create");
        assert_eq!(create_config.response_type, "none");
        assert_eq!(create_config.client_id, use_config.client_id);
    }
}
