use crate::common::{
    CLIENT_ID, CREATE_ISSUER, REDIRECT_URI, TestStateBuilder, USE_ISSUER, query_param,
};
use axum::http::StatusCode;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const REQUEST_URI: &str = "urn:ietf:params:oauth:request_uri:create-123";

#[tokio::test]
async fn test_use_flow_redirects_to_authority() {
    let client = TestStateBuilder::new().app();

    let response = client.post("/flows/use").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    let url = response.location_url();
    assert_eq!(
        url.as_str().split('?').next(),
        Some(format!("{USE_ISSUER}/authorize").as_str())
    );
    assert_eq!(query_param(&url, "client_id").as_deref(), Some(CLIENT_ID));
    assert_eq!(query_param(&url, "redirect_uri").as_deref(), Some(REDIRECT_URI));
    assert_eq!(query_param(&url, "response_type").as_deref(), Some("id_token"));
    assert_eq!(query_param(&url, "response_mode").as_deref(), Some("query"));
    assert_eq!(query_param(&url, "scope").as_deref(), Some("openid"));
    assert!(query_param(&url, "nonce").is_some());
    assert!(query_param(&url, "request_uri").is_none());

    let state = query_param(&url, "state").unwrap();
    assert!(state.starts_with("use."), "state {state} should name the flow");

    let claims: Value = serde_json::from_str(&query_param(&url, "claims").unwrap()).unwrap();
    assert_eq!(claims, json!({ "age_thresholds": [13, 18] }));
}

#[tokio::test]
async fn test_use_flow_sets_signin_cookie() {
    let client = TestStateBuilder::new().app();
    let response = client.post("/flows/use").await;

    let set_cookie = response
        .set_cookies()
        .into_iter()
        .find(|c| c.starts_with("agekey_signin="))
        .expect("signin cookie should be set");

    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));
    // Encrypted: the state is not readable from the cookie
    let state = query_param(&response.location_url(), "state").unwrap();
    assert!(!set_cookie.contains(&state));
}

#[tokio::test]
async fn test_each_use_flow_gets_fresh_state_and_nonce() {
    let client = TestStateBuilder::new().app();

    let first = client.post("/flows/use").await.location_url();
    let second = client.post("/flows/use").await.location_url();

    assert_ne!(query_param(&first, "state"), query_param(&second, "state"));
    assert_ne!(query_param(&first, "nonce"), query_param(&second, "nonce"));
}

#[tokio::test]
async fn test_create_flow_registers_par_then_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/par"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "request_uri": REQUEST_URI,
            "expires_in": 60,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = TestStateBuilder::new().create_issuer(&server.uri()).app();
    let response = client.post("/flows/create").await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert!(response.cookie("agekey_signin").is_some());

    let url = response.location_url();
    assert_eq!(
        url.as_str().split('?').next(),
        Some(format!("{}/authorize", server.uri()).as_str())
    );
    assert_eq!(query_param(&url, "client_id").as_deref(), Some(CLIENT_ID));
    assert_eq!(query_param(&url, "response_type").as_deref(), Some("none"));
    assert_eq!(query_param(&url, "response_mode").as_deref(), Some("query"));
    assert_eq!(query_param(&url, "request_uri").as_deref(), Some(REQUEST_URI));
    assert!(query_param(&url, "claims").is_none());

    // The state registered upstream is the one the browser carries
    let state = query_param(&url, "state").unwrap();
    assert!(state.starts_with("create."));

    let requests = server.received_requests().await.expect("Request recording is on");
    let pushed_state = url::form_urlencoded::parse(&requests[0].body)
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned());
    assert_eq!(pushed_state, Some(state));
}

#[tokio::test]
async fn test_create_flow_relay_failure_returns_home() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/par"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_request"))
        .expect(1)
        .mount(&server)
        .await;

    let client = TestStateBuilder::new().create_issuer(&server.uri()).app();
    let response = client.post("/flows/create").await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/");
    assert!(
        response.cookie("agekey_signin").is_none(),
        "no signin should be recorded for a failed start"
    );
}

#[tokio::test]
async fn test_create_flow_without_secret_never_reaches_authority() {
    let client = TestStateBuilder::new()
        .create_issuer(CREATE_ISSUER)
        .without("AGEKEY_CLIENT_SECRET")
        .app();

    let response = client.post("/flows/create").await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), "/");
}

#[tokio::test]
async fn test_flows_are_disabled_until_configured() {
    for client_id in [None, Some("your_client_id_here")] {
        let builder = TestStateBuilder::new();
        let builder = match client_id {
            Some(id) => builder.var("NEXT_PUBLIC_AGEKEY_CLIENT_ID", id),
            None => builder.without("NEXT_PUBLIC_AGEKEY_CLIENT_ID"),
        };
        let client = builder.app();

        for uri in ["/flows/use", "/flows/create"] {
            let response = client.post(uri).await;
            assert_eq!(response.status, StatusCode::SEE_OTHER);
            assert_eq!(response.location(), "/", "{uri} with client id {client_id:?}");
        }
    }
}
