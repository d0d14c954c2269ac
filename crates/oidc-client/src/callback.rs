// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Validation of the redirect back from the authorize endpoint.

use url::Url;

use crate::{
    error::AuthError,
    store::{PKCE_CODE_VERIFIER_KEY, PKCE_STATE_KEY, SessionStore},
};

/// The PKCE material stored when the login started.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StoredPkce {
    /// The `state` sent to the authorize endpoint.
    pub state: Option<String>,

    /// The code verifier matching the challenge sent to the authorize
    /// endpoint.
    pub code_verifier: Option<String>,
}

impl StoredPkce {
    /// Read the PKCE material from the store.
    pub fn load(store: &impl SessionStore) -> Self {
        Self {
            state: store.get(PKCE_STATE_KEY),
            code_verifier: store.get(PKCE_CODE_VERIFIER_KEY),
        }
    }

    /// Remove the PKCE material from the store. It is single-use, whatever
    /// the outcome of the callback.
    pub fn discard(store: &impl SessionStore) {
        store.delete(PKCE_STATE_KEY);
        store.delete(PKCE_CODE_VERIFIER_KEY);
    }
}

impl std::fmt::Debug for StoredPkce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredPkce")
            .field("state", &self.state)
            .field("has_code_verifier", &self.code_verifier.is_some())
            .finish()
    }
}

/// A validated callback, ready to be exchanged at the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct CallbackCode {
    /// The authorization code.
    pub code: String,

    /// The `state`, equal to the stored one.
    pub state: String,

    /// The stored code verifier.
    pub code_verifier: String,
}

impl std::fmt::Debug for CallbackCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackCode")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Whether the URL looks like a redirect back from the authorize endpoint,
/// that is it carries a `code` or an `error` parameter.
#[must_use]
pub fn is_callback(url: &Url) -> bool {
    url.query_pairs()
        .any(|(name, _)| name == "code" || name == "error")
}

/// Check the parameters of the callback URL against the stored PKCE material.
///
/// The `state` is checked first, so that a forged redirect is always reported
/// as such, even when it carries an error.
///
/// # Errors
///
/// - [`AuthError::StateMismatch`] if the returned `state` differs from the
///   stored one, or either is missing.
/// - [`AuthError::Provider`] if the provider returned an `error`.
/// - [`AuthError::MissingCode`] if there is no `code`.
/// - [`AuthError::MissingCodeVerifier`] if no verifier was stored.
pub fn validate_callback(url: &Url, stored: &StoredPkce) -> Result<CallbackCode, AuthError> {
    let mut code = None;
    let mut state = None;
    let mut error = None;
    let mut error_description = None;

    for (name, value) in url.query_pairs() {
        let slot = match &*name {
            "code" => &mut code,
            "state" => &mut state,
            "error" => &mut error,
            "error_description" => &mut error_description,
            _ => continue,
        };

        // Only the first occurrence of a parameter counts
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }

    let state = match (state, stored.state.as_deref()) {
        (Some(state), Some(expected)) if state == expected => state,
        _ => return Err(AuthError::StateMismatch),
    };

    if let Some(error) = error {
        return Err(AuthError::Provider {
            error,
            description: error_description,
        });
    }

    let code = code
        .filter(|code| !code.is_empty())
        .ok_or(AuthError::MissingCode)?;

    let code_verifier = stored
        .code_verifier
        .clone()
        .ok_or(AuthError::MissingCodeVerifier)?;

    Ok(CallbackCode {
        code,
        state,
        code_verifier,
    })
}
