// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use axum::{
    body::Body,
    http::{HeaderName, Request, Response, StatusCode, header::SET_COOKIE},
};
use axum_extra::extract::cookie::Cookie;
use pkce_demo_oidc_client::ClientConfig;
use tower::ServiceExt as _;
use url::Url;
use wiremock::MockServer;

use crate::{AppState, TAB_SESSION_COOKIE, TabSessions, Templates};

pub(crate) fn setup() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

/// The application, talking to a mock provider
pub(crate) struct TestState {
    pub mock_server: MockServer,
    pub sessions: TabSessions,
    state: AppState,
}

impl TestState {
    pub async fn new() -> Self {
        setup();

        let mock_server = MockServer::start().await;
        let issuer = Url::parse(&mock_server.uri()).expect("Couldn't parse URL");

        let client_config = ClientConfig::new(
            issuer,
            "test-client".to_owned(),
            Url::parse("http://localhost:8080/callback").unwrap(),
            "openid profile email".to_owned(),
            Url::parse("http://localhost:8080/").unwrap(),
        );

        let sessions = TabSessions::new();
        let state = AppState {
            client_config,
            http_client: pkce_demo_http::reqwest_client(),
            sessions: sessions.clone(),
            templates: Templates::load().unwrap(),
        };

        Self {
            mock_server,
            sessions,
            state,
        }
    }

    pub async fn request(&self, request: Request<Body>) -> Response<String> {
        let app: axum::Router = crate::router().with_state(self.state.clone());

        let Ok(response) = app.oneshot(request).await;

        let (parts, body) = response.into_parts();

        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .expect("Failed to read response body");
        let body = std::str::from_utf8(&body)
            .expect("Response body is not valid UTF-8")
            .to_owned();

        Response::from_parts(parts, body)
    }
}

pub(crate) trait RequestBuilderExt {
    /// Sends the cookie of the given tab session.
    fn tab_session(self, id: &str) -> Self;

    /// Builds the request with an empty body.
    fn empty(self) -> Request<Body>;
}

impl RequestBuilderExt for axum::http::request::Builder {
    fn tab_session(self, id: &str) -> Self {
        self.header("cookie", format!("{TAB_SESSION_COOKIE}={id}"))
    }

    fn empty(self) -> Request<Body> {
        self.body(Body::empty()).unwrap()
    }
}

pub(crate) trait ResponseExt {
    /// Asserts that the response has the given status code.
    ///
    /// # Panics
    ///
    /// Panics if the response has a different status code.
    fn assert_status(&self, status: StatusCode);

    /// Asserts that the response has the given header value.
    ///
    /// # Panics
    ///
    /// Panics if the response does not have the given header or if the header
    /// value does not match.
    fn assert_header_value(&self, header: HeaderName, value: &str);

    /// The tab session ID set by the response, if any.
    fn tab_session(&self) -> Option<String>;
}

impl ResponseExt for Response<String> {
    #[track_caller]
    fn assert_status(&self, status: StatusCode) {
        assert_eq!(
            self.status(),
            status,
            "HTTP status code mismatch: got {}, expected {}. Body: {}",
            self.status(),
            status,
            self.body()
        );
    }

    #[track_caller]
    fn assert_header_value(&self, header: HeaderName, value: &str) {
        let actual_value = self
            .headers()
            .get(&header)
            .unwrap_or_else(|| panic!("Missing header {header}"));

        assert_eq!(
            actual_value,
            value,
            "Header mismatch: got {:?}, expected {:?}",
            self.headers().get(&header),
            value
        );
    }

    fn tab_session(&self) -> Option<String> {
        self.headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| Cookie::parse(value.to_owned()).ok())
            .find(|cookie| cookie.name() == TAB_SESSION_COOKIE)
            .map(|cookie| cookie.value().to_owned())
    }
}
