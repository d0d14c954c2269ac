// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Requests for obtaining [Claims] about an end-user.
//!
//! [Claims]: https://openid.net/specs/openid-connect-core-1_0.html#Claims

use headers::{ContentType, HeaderMapExt, HeaderValue};
use http::header::ACCEPT;
use mime::Mime;
use pkce_demo_http::RequestBuilderExt;
use url::Url;

use crate::{error::UserInfoError, types::Claims};

/// Obtain information about an authenticated end-user.
///
/// Returns the claims as a JSON object, in the order the provider sent them.
///
/// # Arguments
///
/// * `http_client` - The reqwest client to use for making HTTP requests.
///
/// * `userinfo_endpoint` - The URL of the issuer's User Info endpoint.
///
/// * `access_token` - The access token of the end-user.
///
/// # Errors
///
/// Returns an error if the request fails, the endpoint answers with a
/// non-success status, or the body is not a JSON object. The content-type of
/// the response is not enforced.
#[tracing::instrument(skip_all, fields(userinfo_endpoint = %userinfo_endpoint))]
pub async fn fetch_userinfo(
    http_client: &reqwest::Client,
    userinfo_endpoint: &Url,
    access_token: &str,
) -> Result<Claims, UserInfoError> {
    tracing::debug!("Obtaining user info…");

    let expected_content_type = mime::APPLICATION_JSON.as_ref();

    let userinfo_response = http_client
        .get(userinfo_endpoint.as_str())
        .bearer_auth(access_token)
        .header(ACCEPT, HeaderValue::from_static(expected_content_type))
        .send_traced()
        .await?;

    let status = userinfo_response.status();
    if !status.is_success() {
        let body = userinfo_response.text().await?;
        tracing::warn!(%status, "Userinfo endpoint returned an error");
        return Err(UserInfoError::Status { status, body });
    }

    // Providers don't always label the claims as JSON: the body decides
    match userinfo_response.headers().typed_try_get::<ContentType>() {
        Ok(Some(content_type)) => {
            let content_type: Mime = content_type.into();
            if content_type.essence_str() != expected_content_type {
                tracing::warn!(
                    %content_type,
                    "Userinfo response is not labelled as JSON, parsing it anyway"
                );
            }
        }
        Ok(None) => tracing::debug!("Userinfo response has no content-type"),
        Err(_) => tracing::warn!("Userinfo response has an invalid content-type"),
    }

    let body = userinfo_response.text().await?;
    let claims: Claims = serde_json::from_str(&body)?;

    Ok(claims)
}
