// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! The login flow of a browser tab.

use rand::{CryptoRng, Rng};
use url::Url;

use crate::{
    callback::{StoredPkce, is_callback, validate_callback},
    error::AuthError,
    requests::{
        authorization_code::{
            AuthorizationRequestData, AuthorizationValidationData,
            access_token_with_authorization_code, build_authorization_url,
        },
        logout::{LogoutData, build_logout_url},
        userinfo::fetch_userinfo,
    },
    store::{ACCESS_TOKEN_KEY, PKCE_CODE_VERIFIER_KEY, PKCE_STATE_KEY, SessionStore},
    types::{Claims, ClientConfig, Session},
};

/// Where a tab stands in the login flow.
///
/// ```text
/// LoggedOut -> LoggingIn -> CallbackPending -> LoggedIn
///                                          \-> LoggedOut
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Nothing is stored.
    LoggedOut,

    /// A login was started and its PKCE material is stored.
    LoggingIn,

    /// The current URL carries the response of the authorize endpoint.
    CallbackPending,

    /// An access token is stored.
    LoggedIn,
}

/// What the page shows after it loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    /// The login affordance.
    LoggedOut,

    /// The claims of the logged-in user, and the logout affordance.
    LoggedIn {
        /// The claims fetched from the userinfo endpoint.
        claims: Claims,
    },
}

/// A public OAuth 2.0 client running the authorization code flow with PKCE
/// for one browser tab.
#[derive(Debug, Clone)]
pub struct PkceAuthClient<S> {
    config: ClientConfig,
    http_client: reqwest::Client,
    store: S,
}

impl<S: SessionStore> PkceAuthClient<S> {
    /// Create a client for the tab backed by `store`.
    #[must_use]
    pub fn new(config: ClientConfig, http_client: reqwest::Client, store: S) -> Self {
        Self {
            config,
            http_client,
            store,
        }
    }

    /// The configuration of the client.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The store of the tab.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Where the tab stands, given the URL it is on.
    ///
    /// A callback URL takes precedence over a stored token, so that a new
    /// login always completes.
    #[must_use]
    pub fn auth_state(&self, current_url: Option<&Url>) -> AuthState {
        if current_url.is_some_and(is_callback) {
            AuthState::CallbackPending
        } else if self.store.get(ACCESS_TOKEN_KEY).is_some() {
            AuthState::LoggedIn
        } else if self.store.get(PKCE_STATE_KEY).is_some() {
            AuthState::LoggingIn
        } else {
            AuthState::LoggedOut
        }
    }

    /// Start a login: generate and store the PKCE material, and return the
    /// URL of the authorize endpoint the browser should be sent to.
    ///
    /// A login already in progress in the same tab is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the authorize URL cannot be built. Nothing is
    /// stored in that case.
    #[tracing::instrument(name = "pkce.login", skip_all)]
    pub fn login(&self, rng: &mut (impl Rng + CryptoRng)) -> Result<Url, AuthError> {
        let authorization_endpoint = self.config.authorization_endpoint()?;

        let (url, validation_data) = build_authorization_url(
            authorization_endpoint,
            AuthorizationRequestData::new(
                self.config.client_id.clone(),
                self.config.scope.clone(),
                self.config.redirect_uri.clone(),
            ),
            rng,
        )?;

        self.store.set(PKCE_STATE_KEY, validation_data.state);
        self.store
            .set(PKCE_CODE_VERIFIER_KEY, validation_data.code_verifier);

        tracing::info!("Redirecting to the authorize endpoint");

        Ok(url)
    }

    /// Complete a login from the URL the authorize endpoint redirected to.
    ///
    /// The stored PKCE material is discarded whatever the outcome. On
    /// failure, no access token is left in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the callback does not belong to the pending login,
    /// carries a provider error, or if exchanging the code or fetching the
    /// user info fails.
    #[tracing::instrument(name = "pkce.handle_callback", skip_all)]
    pub async fn handle_callback(&self, url: &Url) -> Result<Session, AuthError> {
        let stored = StoredPkce::load(&self.store);
        StoredPkce::discard(&self.store);

        let result = self.exchange_callback(url, &stored).await;
        if result.is_err() {
            self.store.delete(ACCESS_TOKEN_KEY);
        }

        result
    }

    async fn exchange_callback(&self, url: &Url, stored: &StoredPkce) -> Result<Session, AuthError> {
        let callback = validate_callback(url, stored)?;

        let token_endpoint = self.config.token_endpoint()?;
        let validation_data = AuthorizationValidationData {
            state: callback.state,
            redirect_uri: self.config.redirect_uri.clone(),
            code_verifier: callback.code_verifier,
        };

        let response = access_token_with_authorization_code(
            &self.http_client,
            &token_endpoint,
            &self.config.client_id,
            &callback.code,
            &validation_data,
        )
        .await?;

        tracing::info!(
            token_type = response.token_type.as_deref(),
            expires_in = response.expires_in,
            "Obtained an access token"
        );

        self.store
            .set(ACCESS_TOKEN_KEY, response.access_token.clone());

        let claims = self.fetch_user_info(&response.access_token).await?;

        Ok(Session {
            access_token: response.access_token,
            claims,
        })
    }

    /// Fetch the claims of the user owning `access_token`.
    ///
    /// Any failure, even a transient one, ends the session: the stored access
    /// token is deleted.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserInfoFetch`] if the request fails or the
    /// response is invalid.
    #[tracing::instrument(name = "pkce.fetch_user_info", skip_all)]
    pub async fn fetch_user_info(&self, access_token: &str) -> Result<Claims, AuthError> {
        let result = async {
            let userinfo_endpoint = self.config.userinfo_endpoint()?;
            let claims = fetch_userinfo(&self.http_client, &userinfo_endpoint, access_token).await?;
            Ok::<_, AuthError>(claims)
        }
        .await;

        if let Err(err) = &result {
            tracing::warn!(
                error = err as &dyn std::error::Error,
                "Could not fetch the user info, discarding the session"
            );
            self.store.delete(ACCESS_TOKEN_KEY);
        }

        result
    }

    /// Log out: clear everything stored for the tab, then return the URL of
    /// the hosted logout endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the logout URL cannot be built. The store is
    /// cleared anyway.
    #[tracing::instrument(name = "pkce.logout", skip_all)]
    pub fn logout(&self) -> Result<Url, AuthError> {
        self.store.clear();

        let logout_endpoint = self.config.logout_endpoint()?;
        let url = build_logout_url(
            logout_endpoint,
            &LogoutData {
                client_id: self.config.client_id.clone(),
                logout_uri: self.config.logout_uri.clone(),
            },
        )?;

        tracing::info!("Redirecting to the logout endpoint");

        Ok(url)
    }

    /// Load the page at `url`, running the step of the flow the tab is at.
    ///
    /// Errors are logged and show the logged-out page.
    #[tracing::instrument(name = "pkce.load_page", skip_all, fields(auth_state))]
    pub async fn load_page(&self, url: &Url) -> Page {
        let state = self.auth_state(Some(url));
        tracing::Span::current().record("auth_state", tracing::field::debug(state));

        let result = match state {
            AuthState::LoggedOut | AuthState::LoggingIn => return Page::LoggedOut,

            AuthState::CallbackPending => self
                .handle_callback(url)
                .await
                .map(|session| session.claims),

            AuthState::LoggedIn => {
                let Some(access_token) = self.store.get(ACCESS_TOKEN_KEY) else {
                    return Page::LoggedOut;
                };
                self.fetch_user_info(&access_token).await
            }
        };

        match result {
            Ok(claims) => Page::LoggedIn { claims },
            Err(err) => {
                tracing::error!(
                    error = &err as &dyn std::error::Error,
                    "Login flow failed"
                );
                Page::LoggedOut
            }
        }
    }
}
