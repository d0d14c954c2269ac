// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Requests for the Token endpoint.

use headers::HeaderValue;
use http::header::ACCEPT;
use pkce_demo_http::RequestBuilderExt;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{error::TokenRequestError, types::AccessTokenResponse};

// Every field is optional so that a response without an access token is
// reported as such, and not as a generic parsing error
#[derive(Deserialize)]
struct RawAccessTokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<u64>,
    id_token: Option<String>,
    refresh_token: Option<String>,
    scope: Option<String>,
}

impl TryFrom<RawAccessTokenResponse> for AccessTokenResponse {
    type Error = TokenRequestError;

    fn try_from(raw: RawAccessTokenResponse) -> Result<Self, Self::Error> {
        let access_token = raw
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(TokenRequestError::MissingAccessToken)?;

        Ok(Self {
            access_token,
            token_type: raw.token_type,
            expires_in: raw.expires_in,
            id_token: raw.id_token,
            refresh_token: raw.refresh_token,
            scope: raw.scope,
        })
    }
}

/// Request an access token.
///
/// The request is sent as an `application/x-www-form-urlencoded` body.
///
/// # Arguments
///
/// * `http_client` - The reqwest client to use for making HTTP requests.
///
/// * `token_endpoint` - The URL of the issuer's Token endpoint.
///
/// * `request` - The form parameters of the grant.
///
/// # Errors
///
/// Returns an error if the request fails, the endpoint answers with a
/// non-success status, or the response has no access token.
#[tracing::instrument(skip_all, fields(token_endpoint = %token_endpoint))]
pub async fn request_access_token<T: Serialize + ?Sized>(
    http_client: &reqwest::Client,
    token_endpoint: &Url,
    request: &T,
) -> Result<AccessTokenResponse, TokenRequestError> {
    tracing::debug!("Requesting access token...");

    let response = http_client
        .post(token_endpoint.as_str())
        .header(ACCEPT, HeaderValue::from_static("application/json"))
        .form(request)
        .send_traced()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::warn!(%status, "Token endpoint returned an error");
        return Err(TokenRequestError::Status { status, body });
    }

    let raw: RawAccessTokenResponse = serde_json::from_str(&body)?;
    raw.try_into()
}
