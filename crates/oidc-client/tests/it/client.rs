// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::collections::HashMap;

use assert_matches::assert_matches;
use pkce_demo_http::reqwest_client;
use pkce_demo_oidc_client::{
    AuthError, AuthState, MemorySessionStore, Page, PkceAuthClient, SessionStore,
    error::UserInfoError,
    pkce::compute_code_challenge,
    store::{ACCESS_TOKEN_KEY, PKCE_CODE_VERIFIER_KEY, PKCE_STATE_KEY},
};
use rand::SeedableRng;
use serde_json::json;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path},
};

use crate::{ACCESS_TOKEN, AUTHORIZATION_CODE, SUBJECT_IDENTIFIER, client_config, init_client};

fn callback_url(query: &str) -> Url {
    Url::parse(&format!("http://localhost:8080/callback?{query}")).unwrap()
}

/// Start a login and return the `state` it stored.
fn start_login(client: &PkceAuthClient<MemorySessionStore>) -> String {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
    client.login(&mut rng).unwrap();
    client.store().get(PKCE_STATE_KEY).unwrap()
}

async fn mount_token_endpoint(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains(format!("code={AUTHORIZATION_CODE}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "token_type": "Bearer",
            "expires_in": 3600,
        })))
        .expect(1)
        .mount(mock_server)
        .await;
}

async fn mount_userinfo_endpoint(mock_server: &MockServer, status: u16) {
    let response = if status == 200 {
        ResponseTemplate::new(200).set_body_json(json!({
            "sub": SUBJECT_IDENTIFIER,
            "email": "janedoe@example.com",
        }))
    } else {
        ResponseTemplate::new(status)
    };

    Mock::given(method("GET"))
        .and(path("/oauth2/userInfo"))
        .and(header(
            "authorization",
            format!("Bearer {ACCESS_TOKEN}").as_str(),
        ))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn login_stores_pkce_material() {
    let (client, _mock_server) = init_client().await;
    assert_eq!(client.auth_state(None), AuthState::LoggedOut);

    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
    let url = client.login(&mut rng).unwrap();

    let state = client.store().get(PKCE_STATE_KEY).unwrap();
    let verifier = client.store().get(PKCE_CODE_VERIFIER_KEY).unwrap();

    let query_pairs = url.query_pairs().collect::<HashMap<_, _>>();
    assert_eq!(url.path(), "/oauth2/authorize");
    assert_eq!(query_pairs.get("code_challenge_method").unwrap(), "S256");
    assert_eq!(
        *query_pairs.get("code_challenge").unwrap(),
        compute_code_challenge(&verifier)
    );
    assert_eq!(*query_pairs.get("state").unwrap(), state);

    assert_eq!(client.auth_state(None), AuthState::LoggingIn);
}

#[tokio::test]
async fn second_login_replaces_the_first() {
    let (client, _mock_server) = init_client().await;
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);

    client.login(&mut rng).unwrap();
    let first = client.store().get(PKCE_STATE_KEY).unwrap();
    client.login(&mut rng).unwrap();
    let second = client.store().get(PKCE_STATE_KEY).unwrap();

    assert_ne!(first, second);
}

#[tokio::test]
async fn successful_callback() {
    let (client, mock_server) = init_client().await;
    mount_token_endpoint(&mock_server).await;
    mount_userinfo_endpoint(&mock_server, 200).await;

    let state = start_login(&client);
    let url = callback_url(&format!("code={AUTHORIZATION_CODE}&state={state}"));
    assert_eq!(client.auth_state(Some(&url)), AuthState::CallbackPending);

    let session = client.handle_callback(&url).await.unwrap();
    assert_eq!(session.access_token, ACCESS_TOKEN);
    assert_eq!(session.claims.get("sub").unwrap(), SUBJECT_IDENTIFIER);

    let store = client.store();
    assert_eq!(store.get(ACCESS_TOKEN_KEY).as_deref(), Some(ACCESS_TOKEN));
    assert_eq!(store.get(PKCE_STATE_KEY), None);
    assert_eq!(store.get(PKCE_CODE_VERIFIER_KEY), None);
    assert_eq!(client.auth_state(None), AuthState::LoggedIn);
}

#[tokio::test]
async fn state_mismatch_makes_no_request() {
    let (client, mock_server) = init_client().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    start_login(&client);
    let url = callback_url(&format!("code={AUTHORIZATION_CODE}&state=forged"));

    let error = client.handle_callback(&url).await.unwrap_err();
    assert_matches!(error, AuthError::StateMismatch);

    assert!(client.store().is_empty());
    assert_eq!(client.auth_state(None), AuthState::LoggedOut);
}

#[tokio::test]
async fn callback_without_login() {
    let (client, _mock_server) = init_client().await;
    let url = callback_url(&format!("code={AUTHORIZATION_CODE}&state=whatever"));

    let error = client.handle_callback(&url).await.unwrap_err();
    assert_matches!(error, AuthError::StateMismatch);
}

#[tokio::test]
async fn provider_error_redirect() {
    let (client, _mock_server) = init_client().await;
    let state = start_login(&client);
    let url = callback_url(&format!(
        "error=access_denied&error_description=denied&state={state}"
    ));

    let error = client.handle_callback(&url).await.unwrap_err();
    assert_matches!(error, AuthError::Provider { error, .. } => {
        assert_eq!(error, "access_denied");
    });
    assert!(client.store().is_empty());
}

#[tokio::test]
async fn rejected_code() {
    let (client, mock_server) = init_client().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let state = start_login(&client);
    let url = callback_url(&format!("code={AUTHORIZATION_CODE}&state={state}"));

    let error = client.handle_callback(&url).await.unwrap_err();
    assert_matches!(error, AuthError::TokenExchange(_));
    assert!(client.store().is_empty());
}

#[tokio::test]
async fn userinfo_failure_after_exchange() {
    let (client, mock_server) = init_client().await;
    mount_token_endpoint(&mock_server).await;
    mount_userinfo_endpoint(&mock_server, 500).await;

    let state = start_login(&client);
    let url = callback_url(&format!("code={AUTHORIZATION_CODE}&state={state}"));

    let error = client.handle_callback(&url).await.unwrap_err();
    assert_matches!(error, AuthError::UserInfoFetch(_));
    assert!(client.store().is_empty());
}

#[tokio::test]
async fn unauthorized_userinfo_logs_out() {
    for status in [401, 403] {
        let (client, mock_server) = init_client().await;
        mount_userinfo_endpoint(&mock_server, status).await;

        client
            .store()
            .set(ACCESS_TOKEN_KEY, ACCESS_TOKEN.to_owned());
        assert_eq!(client.auth_state(None), AuthState::LoggedIn);

        let error = client.fetch_user_info(ACCESS_TOKEN).await.unwrap_err();
        assert_matches!(error, AuthError::UserInfoFetch(_), "status {status}");

        assert_eq!(client.store().get(ACCESS_TOKEN_KEY), None, "status {status}");
        assert_eq!(client.auth_state(None), AuthState::LoggedOut);
    }
}

#[tokio::test]
async fn unreachable_userinfo_logs_out() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    // Grab a free port and close it, so that connections are refused
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = PkceAuthClient::new(
        client_config(Url::parse(&format!("http://{addr}/")).unwrap()),
        reqwest_client(),
        MemorySessionStore::new(),
    );
    client
        .store()
        .set(ACCESS_TOKEN_KEY, ACCESS_TOKEN.to_owned());

    let error = client.fetch_user_info(ACCESS_TOKEN).await.unwrap_err();
    assert_matches!(error, AuthError::UserInfoFetch(UserInfoError::Http(_)));

    // A network failure ends the session like a rejected token
    assert_eq!(client.store().get(ACCESS_TOKEN_KEY), None);
    assert_eq!(client.auth_state(None), AuthState::LoggedOut);
}

#[tokio::test]
async fn logout_clears_the_store() {
    let (client, _mock_server) = init_client().await;
    start_login(&client);
    client
        .store()
        .set(ACCESS_TOKEN_KEY, ACCESS_TOKEN.to_owned());

    let url = client.logout().unwrap();
    assert!(client.store().is_empty());

    assert_eq!(url.path(), "/logout");
    let query_pairs = url.query_pairs().collect::<HashMap<_, _>>();
    assert_eq!(query_pairs.get("client_id").unwrap(), crate::CLIENT_ID);
    assert_eq!(query_pairs.get("logout_uri").unwrap(), crate::LOGOUT_URI);
}

#[tokio::test]
async fn logout_clears_the_store_when_the_url_cannot_be_built() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    let client = PkceAuthClient::new(
        client_config(Url::parse("data:text/plain,provider").unwrap()),
        reqwest_client(),
        MemorySessionStore::new(),
    );
    client
        .store()
        .set(ACCESS_TOKEN_KEY, ACCESS_TOKEN.to_owned());

    let error = client.logout().unwrap_err();
    assert_matches!(error, AuthError::Endpoint(_));
    assert!(client.store().is_empty());
}

#[tokio::test]
async fn load_page_logged_out() {
    let (client, _mock_server) = init_client().await;
    let url = Url::parse("http://localhost:8080/").unwrap();

    assert_eq!(client.load_page(&url).await, Page::LoggedOut);

    // A pending login without a callback shows the login affordance again
    start_login(&client);
    assert_eq!(client.load_page(&url).await, Page::LoggedOut);
}

#[tokio::test]
async fn load_page_completes_the_flow() {
    let (client, mock_server) = init_client().await;
    mount_token_endpoint(&mock_server).await;
    mount_userinfo_endpoint(&mock_server, 200).await;

    let state = start_login(&client);
    let url = callback_url(&format!("code={AUTHORIZATION_CODE}&state={state}"));

    let page = client.load_page(&url).await;
    let claims = assert_matches!(page, Page::LoggedIn { claims } => claims);
    assert_eq!(claims.get("email").unwrap(), "janedoe@example.com");

    // Reloading the home page fetches the user info with the stored token
    let home = Url::parse("http://localhost:8080/").unwrap();
    assert_matches!(client.load_page(&home).await, Page::LoggedIn { .. });
}

#[tokio::test]
async fn load_page_hides_errors() {
    let (client, _mock_server) = init_client().await;
    start_login(&client);
    let url = callback_url("code=abc&state=forged");

    assert_eq!(client.load_page(&url).await, Page::LoggedOut);
    assert!(client.store().is_empty());
}
