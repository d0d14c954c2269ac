// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use pkce_demo_oidc_client::{ClientConfig, MemorySessionStore, PkceAuthClient};
use url::Url;
use wiremock::MockServer;

mod client;
mod requests;

const REDIRECT_URI: &str = "http://localhost:8080/callback";
const LOGOUT_URI: &str = "http://localhost:8080/";
const CLIENT_ID: &str = "client!+ID";
const SCOPE: &str = "openid profile email";
const AUTHORIZATION_CODE: &str = "authC0D3";
const CODE_VERIFIER: &str = "cODEv3R1f1ER";
const ACCESS_TOKEN: &str = "AccessToken1";
const SUBJECT_IDENTIFIER: &str = "SubjectID";

async fn init_test() -> (reqwest::Client, MockServer, Url) {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let client = pkce_demo_http::reqwest_client();
    let mock_server = MockServer::start().await;
    let issuer = Url::parse(&mock_server.uri()).expect("Couldn't parse URL");

    (client, mock_server, issuer)
}

fn client_config(issuer: Url) -> ClientConfig {
    ClientConfig::new(
        issuer,
        CLIENT_ID.to_owned(),
        Url::parse(REDIRECT_URI).unwrap(),
        SCOPE.to_owned(),
        Url::parse(LOGOUT_URI).unwrap(),
    )
}

async fn init_client() -> (PkceAuthClient<MemorySessionStore>, MockServer) {
    let (http_client, mock_server, issuer) = init_test().await;
    let client = PkceAuthClient::new(
        client_config(issuer),
        http_client,
        MemorySessionStore::new(),
    );

    (client, mock_server)
}
