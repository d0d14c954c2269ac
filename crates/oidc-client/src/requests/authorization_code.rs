// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Requests for the [Authorization Code flow] with [PKCE].
//!
//! [Authorization Code flow]: https://www.rfc-editor.org/rfc/rfc6749#section-4.1
//! [PKCE]: https://www.rfc-editor.org/rfc/rfc7636

use rand::{CryptoRng, Rng};
use serde::Serialize;
use url::Url;

use crate::{
    error::{AuthorizationError, TokenRequestError},
    pkce::{CODE_CHALLENGE_METHOD, PkceState},
    requests::token::request_access_token,
    types::AccessTokenResponse,
    utils::append_query,
};

/// The data necessary to build an authorization request.
#[derive(Debug, Clone)]
pub struct AuthorizationRequestData {
    /// The ID obtained when registering the client.
    pub client_id: String,

    /// The space-separated scope to authorize.
    pub scope: String,

    /// The URI to redirect the end-user to after the authorization.
    ///
    /// It must be one of the redirect URIs provided during registration.
    pub redirect_uri: Url,
}

impl AuthorizationRequestData {
    /// Constructs a new `AuthorizationRequestData` with all the required
    /// fields.
    #[must_use]
    pub fn new(client_id: String, scope: String, redirect_uri: Url) -> Self {
        Self {
            client_id,
            scope,
            redirect_uri,
        }
    }
}

/// The data necessary to validate the callback and exchange the code at the
/// Token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationValidationData {
    /// A unique identifier for the request.
    pub state: String,

    /// The URI where the end-user will be redirected after authorization.
    pub redirect_uri: Url,

    /// A string to correlate the authorization request to the token request.
    pub code_verifier: String,
}

impl std::fmt::Debug for AuthorizationValidationData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationValidationData")
            .field("state", &self.state)
            .field("redirect_uri", &self.redirect_uri)
            .finish_non_exhaustive()
    }
}

// Fields are serialized in declaration order, which is the order of the
// parameters in the URL
#[derive(Serialize)]
struct AuthorizationRequest<'a> {
    client_id: &'a str,
    response_type: &'static str,
    scope: &'a str,
    redirect_uri: &'a str,
    state: &'a str,
    code_challenge_method: &'static str,
    code_challenge: &'a str,
}

/// Build the URL for authenticating at the Authorization endpoint.
///
/// # Arguments
///
/// * `authorization_endpoint` - The URL of the issuer's authorization endpoint.
///
/// * `authorization_data` - The data necessary to build the authorization
///   request.
///
/// * `rng` - A cryptographically secure random number generator, used for the
///   `state` and the code verifier.
///
/// # Returns
///
/// A URL to be opened in a web browser where the end-user will be able to
/// authorize the given scope, and the [`AuthorizationValidationData`] to
/// validate this request.
///
/// The redirect URI will receive parameters in its query:
///
/// * A successful response will receive a `code` and a `state`.
///
/// * If the authorization fails, it should receive an `error` parameter and
///   optionally an `error_description`.
///
/// # Errors
///
/// Returns an error if preparing the URL fails.
pub fn build_authorization_url(
    authorization_endpoint: Url,
    authorization_data: AuthorizationRequestData,
    rng: &mut (impl Rng + CryptoRng),
) -> Result<(Url, AuthorizationValidationData), AuthorizationError> {
    tracing::debug!(scope = %authorization_data.scope, "Authorizing...");

    let AuthorizationRequestData {
        client_id,
        scope,
        redirect_uri,
    } = authorization_data;

    let PkceState {
        state,
        code_verifier,
        code_challenge,
    } = PkceState::generate(rng);

    let request = AuthorizationRequest {
        client_id: &client_id,
        response_type: "code",
        scope: &scope,
        redirect_uri: redirect_uri.as_str(),
        state: &state,
        code_challenge_method: CODE_CHALLENGE_METHOD,
        code_challenge: &code_challenge,
    };

    let authorization_url = append_query(authorization_endpoint, &request)?;

    let validation_data = AuthorizationValidationData {
        state,
        redirect_uri,
        code_verifier,
    };

    Ok((authorization_url, validation_data))
}

#[derive(Serialize)]
struct AuthorizationCodeGrant<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    code: &'a str,
    redirect_uri: &'a str,
    code_verifier: &'a str,
}

/// Exchange an authorization code for an access token.
///
/// # Arguments
///
/// * `http_client` - The reqwest client to use for making HTTP requests.
///
/// * `token_endpoint` - The URL of the issuer's Token endpoint.
///
/// * `client_id` - The ID obtained when registering the client. The client is
///   public, so this is its only credential.
///
/// * `code` - The authorization code returned at the Authorization endpoint.
///
/// * `validation_data` - The validation data that was returned when building
///   the Authorization URL, for the state returned at the Authorization
///   endpoint.
///
/// # Errors
///
/// Returns an error if the request fails or the response is invalid.
#[tracing::instrument(skip_all, fields(token_endpoint = %token_endpoint))]
pub async fn access_token_with_authorization_code(
    http_client: &reqwest::Client,
    token_endpoint: &Url,
    client_id: &str,
    code: &str,
    validation_data: &AuthorizationValidationData,
) -> Result<AccessTokenResponse, TokenRequestError> {
    tracing::debug!("Exchanging authorization code for access token...");

    let grant = AuthorizationCodeGrant {
        grant_type: "authorization_code",
        client_id,
        code,
        redirect_uri: validation_data.redirect_uri.as_str(),
        code_verifier: &validation_data.code_verifier,
    };

    request_access_token(http_client, token_endpoint, &grant).await
}
