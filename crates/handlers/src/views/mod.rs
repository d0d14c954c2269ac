// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use pkce_demo_oidc_client::AuthError;
use thiserror::Error;

use crate::templates::TemplateError;

pub mod index;
pub mod login;
pub mod logout;

#[derive(Debug, Error)]
pub(crate) enum RouteError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        tracing::error!(
            error = &self as &dyn std::error::Error,
            "Failed to serve the page"
        );

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<h1>Something went wrong</h1>"),
        )
            .into_response()
    }
}
