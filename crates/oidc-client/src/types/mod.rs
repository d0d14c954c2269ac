// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Types shared by the requests and the client.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// The claims returned by the userinfo endpoint, in the order the provider
/// sent them.
pub type Claims = serde_json::Map<String, Value>;

/// Build the base URL of a hosted identity provider from its domain, like
/// `example.auth.us-east-1.amazoncognito.com`.
///
/// # Errors
///
/// Returns an error if the domain does not form a valid URL.
pub fn issuer_from_domain(domain: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!("https://{domain}/"))
}

/// The static configuration of the client, provided at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// The base URL of the identity provider. All endpoints are relative to
    /// it.
    pub issuer: Url,

    /// The ID obtained when registering the client.
    pub client_id: String,

    /// The URI the provider redirects to after the authorization.
    pub redirect_uri: Url,

    /// The space-separated scope to request.
    pub scope: String,

    /// Where the provider sends the browser after logging out.
    pub logout_uri: Url,
}

impl ClientConfig {
    /// Constructs a new `ClientConfig`.
    ///
    /// The issuer path is normalized to end with a slash, so that endpoints
    /// are resolved below it.
    #[must_use]
    pub fn new(
        mut issuer: Url,
        client_id: String,
        redirect_uri: Url,
        scope: String,
        logout_uri: Url,
    ) -> Self {
        if !issuer.cannot_be_a_base() && !issuer.path().ends_with('/') {
            let path = format!("{}/", issuer.path());
            issuer.set_path(&path);
        }

        Self {
            issuer,
            client_id,
            redirect_uri,
            scope,
            logout_uri,
        }
    }

    /// The URL of the authorize endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the issuer cannot be used as a base URL.
    pub fn authorization_endpoint(&self) -> Result<Url, url::ParseError> {
        self.issuer.join("oauth2/authorize")
    }

    /// The URL of the token endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the issuer cannot be used as a base URL.
    pub fn token_endpoint(&self) -> Result<Url, url::ParseError> {
        self.issuer.join("oauth2/token")
    }

    /// The URL of the userinfo endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the issuer cannot be used as a base URL.
    pub fn userinfo_endpoint(&self) -> Result<Url, url::ParseError> {
        self.issuer.join("oauth2/userInfo")
    }

    /// The URL of the hosted logout endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the issuer cannot be used as a base URL.
    pub fn logout_endpoint(&self) -> Result<Url, url::ParseError> {
        self.issuer.join("logout")
    }
}

/// A successful response from the token endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    /// The opaque bearer token.
    pub access_token: String,

    /// The type of the token, usually `Bearer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// The lifetime of the access token, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,

    /// The ID token, when the `openid` scope was granted. It is not verified
    /// by this client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// The refresh token. This client never uses it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// The scope that was granted, if different from the requested one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl std::fmt::Debug for AccessTokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenResponse")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("has_id_token", &self.id_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// A logged-in session, the outcome of a completed callback.
#[derive(Clone, PartialEq)]
pub struct Session {
    /// The access token, also kept in the session store.
    pub access_token: String,

    /// The claims fetched with the access token.
    pub claims: Claims,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}
