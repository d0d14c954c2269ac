// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use pkce_demo_oidc_client::{ClientConfig, PkceAuthClient};

use super::RouteError;
use crate::{
    tab_session::TabSession,
    templates::{IndexContext, Templates},
};

#[tracing::instrument(name = "handlers.views.logout.get", skip_all)]
pub(crate) async fn get(
    session: TabSession,
    State(config): State<ClientConfig>,
    State(http_client): State<reqwest::Client>,
    State(templates): State<Templates>,
) -> Result<Response, RouteError> {
    let client = PkceAuthClient::new(config, http_client, session.store.clone());

    match client.logout() {
        Ok(url) => Ok((session.into_jar(), Redirect::temporary(url.as_str())).into_response()),
        Err(err) => {
            // The tab is logged out locally even if the provider can't be reached
            tracing::error!(
                error = &err as &dyn std::error::Error,
                "Could not build the logout URL"
            );
            let html = templates.render_index(&IndexContext::logged_out())?;
            Ok((session.into_jar(), Html(html)).into_response())
        }
    }
}
