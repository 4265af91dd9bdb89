use agekey_api::{
    ApiConfig, ApiState,
    oidc::{Flow, FlowClients, FlowConfig, build_client},
    router,
    state::http_client,
};
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use openidconnect::{AuthUrl, IssuerUrl, core::CoreJsonWebKeySet};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tower::ServiceExt;
use url::Url;

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const REDIRECT_URI: &str = "http://localhost:3000/callback";
pub const USE_ISSUER: &str = "https://agekey.test/v1/oidc/use";
pub const CREATE_ISSUER: &str = "https://agekey.test/v1/oidc/create";
pub const COOKIE_SECRET: &str =
    "test_cookie_secret_minimum_64_characters_long_for_secure_encryption";

const SIGNING_KEY: &[u8] = include_bytes!("../fixtures/signing_key.pem");
const JWKS: &str = include_str!("../fixtures/jwks.json");

/// Test state builder. Clients are built from fixed provider details so no
/// discovery request is made; only the PAR endpoint is ever called.
pub struct TestStateBuilder {
    vars: Vec<(String, String)>,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        let vars = [
            ("NEXT_PUBLIC_AGEKEY_CLIENT_ID", CLIENT_ID),
            ("AGEKEY_CLIENT_SECRET", CLIENT_SECRET),
            ("NEXT_PUBLIC_AGEKEY_REDIRECT_URI", REDIRECT_URI),
            ("NEXT_PUBLIC_AGEKEY_USE_ISSUER", USE_ISSUER),
            ("NEXT_PUBLIC_AGEKEY_CREATE_ISSUER", CREATE_ISSUER),
            ("COOKIE_SECRET", COOKIE_SECRET),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self { vars }
    }

    pub fn var(mut self, name: &str, value: &str) -> Self {
        self.vars.retain(|(k, _)| k != name);
        self.vars.push((name.to_string(), value.to_string()));
        self
    }

    pub fn without(mut self, name: &str) -> Self {
        self.vars.retain(|(k, _)| k != name);
        self
    }

    /// Point the create authority (and so the PAR endpoint) at a mock server.
    pub fn create_issuer(self, uri: &str) -> Self {
        self.var("NEXT_PUBLIC_AGEKEY_CREATE_ISSUER", uri)
    }

    pub fn build(self) -> ApiState {
        let config = ApiConfig::from_vars(self.vars).expect("Invalid test configuration");
        let jwks: CoreJsonWebKeySet = serde_json::from_str(JWKS).expect("Invalid JWKS fixture");

        let client = |flow: Flow| {
            let flow_config = FlowConfig::new(flow, &config);
            build_client(
                &flow_config,
                IssuerUrl::new(flow_config.authority.clone()).expect("Invalid issuer"),
                AuthUrl::new(format!("{}/authorize", flow_config.authority))
                    .expect("Invalid authorization endpoint"),
                jwks.clone(),
            )
            .expect("Failed to build client")
        };
        let clients = FlowClients::new(client(Flow::Use), client(Flow::Create));

        ApiState::with_clients(
            &config,
            clients,
            http_client().expect("Failed to build HTTP client"),
        )
        .expect("Failed to create test state")
    }

    pub fn app(self) -> TestClient {
        TestClient::new(router::router().with_state(self.build()))
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Mint an RS256 ID token signed with the fixture key.
pub fn id_token(claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some("test-key".to_string());

    let key = EncodingKey::from_rsa_pem(SIGNING_KEY).expect("Invalid signing key fixture");
    jsonwebtoken::encode(&header, claims, &key).expect("Failed to sign ID token")
}

/// Claims AgeKey would issue for a successful Use flow.
pub fn use_claims(nonce: &str) -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "iss": USE_ISSUER,
        "aud": CLIENT_ID,
        "sub": "agekey-subject",
        "iat": now,
        "exp": now + 300,
        "nonce": nonce,
        "age_thresholds": { "13": true, "18": false },
    })
}

/// Helper to make requests to the test app
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            body: body_bytes.to_vec(),
            headers,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.get_with_cookie(uri, None).await
    }

    /// Send a GET request, replaying a `name=value` cookie if one is given
    pub async fn get_with_cookie(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let mut request = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }

        self.request(request.body(Body::empty()).expect("Failed to build request"))
            .await
    }

    /// Send a POST request with no body
    pub async fn post(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .expect("Failed to build request");

        self.request(request).await
    }

    /// Send a POST request with a raw JSON body
    pub async fn post_raw_json(&self, uri: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request");

        self.request(request).await
    }

    pub async fn post_json<T: serde::Serialize>(&self, uri: &str, body: &T) -> TestResponse {
        let json_body = serde_json::to_string(body).expect("Failed to serialize body");
        self.post_raw_json(uri, &json_body).await
    }
}

/// Test response wrapper
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub headers: HeaderMap,
}

impl TestResponse {
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Response body is not UTF-8")
    }

    pub fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .expect("Missing Location header")
            .to_str()
            .expect("Invalid Location header")
    }

    pub fn location_url(&self) -> Url {
        Url::parse(self.location()).expect("Location is not an absolute URL")
    }

    /// The `name=value` pair of a cookie set by this response
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.set_cookies()
            .into_iter()
            .find(|c| c.starts_with(&format!("{name}=")))
            .and_then(|c| c.split(';').next().map(str::to_string))
    }

    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect()
    }
}

/// Look up a query parameter of a URL
pub fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
