use serde::Deserialize;

/// Placeholder shipped in `.env.example`; a client id equal to it is not configured.
pub const PLACEHOLDER_CLIENT_ID: &str = "your_client_id_here";

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:3000/callback";
pub const DEFAULT_USE_ISSUER: &str = "https://api.agekey.org/v1/oidc/use";
pub const DEFAULT_CREATE_ISSUER: &str = "https://api.agekey.org/v1/oidc/create";

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// Process configuration, read once at startup.
///
/// The AgeKey variables keep the names the hosted demo documents, so an
/// existing `.env.local` works unchanged. Values are kept raw here: the flows
/// fall back to documented defaults, the PAR relay does not.
#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(rename = "next_public_agekey_client_id")]
    pub client_id: Option<String>,
    #[serde(rename = "agekey_client_secret")]
    pub client_secret: Option<String>,
    #[serde(rename = "next_public_agekey_redirect_uri")]
    pub redirect_uri: Option<String>,
    #[serde(rename = "next_public_agekey_use_issuer")]
    pub use_issuer: Option<String>,
    #[serde(rename = "next_public_agekey_create_issuer")]
    pub create_issuer: Option<String>,

    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_port")]
    pub port: u16,
    pub cookie_secret: Option<String>,
    #[serde(rename = "agekey_signin_expiry_minutes", default = "default_signin_expiry")]
    pub signin_expiry_minutes: u32,
    #[serde(rename = "agekey_require_created_flag", default)]
    pub require_created_flag: bool,
}

const fn default_port() -> u16 {
    3000
}

const fn default_signin_expiry() -> u32 {
    30
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars)
    }

    /// Client id used to build authorization requests.
    pub fn flow_client_id(&self) -> &str {
        non_empty(self.client_id.as_deref()).unwrap_or(PLACEHOLDER_CLIENT_ID)
    }

    /// Redirect URI used to build authorization requests.
    pub fn flow_redirect_uri(&self) -> &str {
        non_empty(self.redirect_uri.as_deref()).unwrap_or(DEFAULT_REDIRECT_URI)
    }

    pub fn use_issuer(&self) -> &str {
        non_empty(self.use_issuer.as_deref()).unwrap_or(DEFAULT_USE_ISSUER)
    }

    pub fn create_issuer(&self) -> &str {
        non_empty(self.create_issuer.as_deref()).unwrap_or(DEFAULT_CREATE_ISSUER)
    }

    /// Whether a real client id has been provided.
    pub fn is_configured(&self) -> bool {
        non_empty(self.client_id.as_deref())
            .is_some_and(|id| id != PLACEHOLDER_CLIENT_ID && !id.trim().is_empty())
    }
}

/// Treats an empty variable the same as an unset one.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
