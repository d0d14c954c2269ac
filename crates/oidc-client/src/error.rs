// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! The error types used in this crate.

use http::StatusCode;
use thiserror::Error;

/// All possible errors when building the authorization URL.
#[derive(Debug, Error)]
pub enum AuthorizationError {
    /// An error occurred serializing the request.
    #[error(transparent)]
    UrlEncoded(#[from] serde_urlencoded::ser::Error),
}

/// All possible errors when requesting an access token.
#[derive(Debug, Error)]
pub enum TokenRequestError {
    /// The HTTP client returned an error.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The token endpoint answered with a non-success status code.
    #[error("token endpoint returned {status}: {body}")]
    Status {
        /// The status code of the response.
        status: StatusCode,
        /// The raw body of the response.
        body: String,
    },

    /// The response body is not valid JSON.
    #[error("invalid token response")]
    Json(#[from] serde_json::Error),

    /// The response did not include an access token.
    #[error("no access token in the token response")]
    MissingAccessToken,
}

/// All possible errors when requesting user info.
#[derive(Debug, Error)]
pub enum UserInfoError {
    /// The userinfo endpoint answered with a non-success status code.
    #[error("userinfo endpoint returned {status}: {body}")]
    Status {
        /// The status code of the response.
        status: StatusCode,
        /// The raw body of the response.
        body: String,
    },

    /// The response body is not a JSON object.
    #[error("invalid userinfo response")]
    Json(#[from] serde_json::Error),

    /// An error occurred sending the request.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// All possible errors when building the logout URL.
#[derive(Debug, Error)]
pub enum LogoutError {
    /// An error occurred serializing the request.
    #[error(transparent)]
    UrlEncoded(#[from] serde_urlencoded::ser::Error),
}

/// Errors ending a step of the login flow.
///
/// Every one of them is terminal for the current flow: nothing is retried and
/// the tab is brought back to its logged-out state.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The `state` returned by the provider does not match the one stored
    /// when the login started, or one of them is missing.
    #[error("state parameter mismatch")]
    StateMismatch,

    /// The callback URL has no authorization code.
    #[error("missing authorization code in the callback")]
    MissingCode,

    /// No code verifier was stored for this login attempt.
    #[error("missing PKCE code verifier")]
    MissingCodeVerifier,

    /// The provider redirected back with an error.
    #[error("the provider returned an error: {error}")]
    Provider {
        /// The error code, like `access_denied`.
        error: String,
        /// The human-readable description, if any.
        description: Option<String>,
    },

    /// A provider endpoint could not be derived from the configured issuer.
    #[error("invalid provider endpoint")]
    Endpoint(#[from] url::ParseError),

    /// An error occurred building the authorization URL.
    #[error("failed to build the authorization URL")]
    Authorization(#[from] AuthorizationError),

    /// The provider rejected the authorization code.
    #[error("failed to exchange the authorization code")]
    TokenExchange(#[from] TokenRequestError),

    /// The access token could not be used to fetch the user info.
    #[error("failed to fetch the user info")]
    UserInfoFetch(#[from] UserInfoError),

    /// An error occurred building the logout URL.
    #[error("failed to build the logout URL")]
    Logout(#[from] LogoutError),
}
