// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! The pages of the login demo.
//!
//! Each browser is a "tab": it gets its own session store, selected by the
//! `tab_session` cookie once something is stored, and drives the PKCE flow
//! through these routes:
//!
//! - `GET /` and `GET /callback` load the page. When the URL carries the
//!   response of the provider, the pending login is completed and the browser
//!   is sent back to `/` with a `303`
//! - `GET /login` starts a login and redirects to the provider
//! - `GET /logout` clears the tab and redirects to the provider logout

#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

use axum::{Router, extract::FromRef, routing::get};
use pkce_demo_oidc_client::ClientConfig;

mod tab_session;
mod templates;
mod views;

#[cfg(test)]
mod test_utils;

pub use self::{
    tab_session::{DEFAULT_CAPACITY, TAB_SESSION_COOKIE, TabSession, TabSessions},
    templates::{IndexContext, TemplateError, TemplateLoadingError, Templates},
};

/// The state shared by all the routes
#[derive(Debug, Clone)]
pub struct AppState {
    /// The configuration of the OAuth 2.0 client
    pub client_config: ClientConfig,

    /// The HTTP client used to talk to the provider
    pub http_client: reqwest::Client,

    /// The stores of every tab
    pub sessions: TabSessions,

    /// The page templates
    pub templates: Templates,
}

impl FromRef<AppState> for ClientConfig {
    fn from_ref(input: &AppState) -> Self {
        input.client_config.clone()
    }
}

impl FromRef<AppState> for reqwest::Client {
    fn from_ref(input: &AppState) -> Self {
        input.http_client.clone()
    }
}

impl FromRef<AppState> for TabSessions {
    fn from_ref(input: &AppState) -> Self {
        input.sessions.clone()
    }
}

impl FromRef<AppState> for Templates {
    fn from_ref(input: &AppState) -> Self {
        input.templates.clone()
    }
}

/// The routes of the pages
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ClientConfig: FromRef<S>,
    reqwest::Client: FromRef<S>,
    TabSessions: FromRef<S>,
    Templates: FromRef<S>,
{
    Router::new()
        .route("/", get(self::views::index::get))
        .route("/callback", get(self::views::index::get))
        .route("/login", get(self::views::login::get))
        .route("/logout", get(self::views::logout::get))
}
