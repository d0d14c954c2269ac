// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! The logout redirect of hosted identity providers.
//!
//! Unlike [RP-Initiated Logout], the hosted UI identifies the client by its ID
//! and redirects to a `logout_uri` registered for it. No ID token hint is
//! sent.
//!
//! [RP-Initiated Logout]: https://openid.net/specs/openid-connect-rpinitiated-1_0.html

use serde::Serialize;
use url::Url;

use crate::{error::LogoutError, utils::append_query};

/// The data necessary to build a logout request.
#[derive(Debug, Clone, Serialize)]
pub struct LogoutData {
    /// The ID obtained when registering the client.
    pub client_id: String,

    /// The URI the end-user is sent to after logging out.
    ///
    /// It must be one of the sign-out URLs provided during registration.
    pub logout_uri: Url,
}

/// Build the URL for logging out at the hosted logout endpoint.
///
/// # Errors
///
/// Returns an error if preparing the URL fails.
pub fn build_logout_url(
    logout_endpoint: Url,
    logout_data: &LogoutData,
) -> Result<Url, LogoutError> {
    tracing::debug!(logout_uri = %logout_data.logout_uri, "Logging out...");

    Ok(append_query(logout_endpoint, logout_data)?)
}
