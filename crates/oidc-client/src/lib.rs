// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! An [OAuth 2.0] client for the [Authorization Code] flow with [PKCE],
//! targeting hosted identity providers such as the Cognito hosted UI.
//!
//! # Scope
//!
//! The client is public: it has no secret and relies on PKCE to bind the
//! authorization code to the login attempt that requested it.
//!
//! - [`pkce`] generates the `state`, the code verifier and its S256 challenge.
//! - [`requests`] talks to the authorize, token, userinfo and logout
//!   endpoints.
//! - [`store`] abstracts the tab-local key/value storage holding the PKCE
//!   material and the access token.
//! - [`client`] ties everything together in [`PkceAuthClient`], which drives
//!   one login attempt from the redirect to the rendered user info.
//!
//! [OAuth 2.0]: https://oauth.net/2/
//! [Authorization Code]: https://www.rfc-editor.org/rfc/rfc6749#section-4.1
//! [PKCE]: https://www.rfc-editor.org/rfc/rfc7636

#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod callback;
pub mod client;
pub mod error;
pub mod pkce;
pub mod requests;
pub mod store;
pub mod types;
mod utils;

pub use self::{
    client::{AuthState, Page, PkceAuthClient},
    error::AuthError,
    store::{MemorySessionStore, SessionStore},
    types::{Claims, ClientConfig, Session},
};
