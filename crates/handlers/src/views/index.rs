// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use axum::{
    extract::{OriginalUri, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use pkce_demo_oidc_client::{AuthError, AuthState, ClientConfig, PkceAuthClient};

use super::RouteError;
use crate::{
    tab_session::TabSession,
    templates::{IndexContext, Templates},
};

#[tracing::instrument(name = "handlers.views.index.get", skip_all)]
pub(crate) async fn get(
    session: TabSession,
    State(config): State<ClientConfig>,
    State(http_client): State<reqwest::Client>,
    State(templates): State<Templates>,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, RouteError> {
    // The flow only looks at the query, so the URL is rebuilt on the
    // configured redirect URI
    let url = config
        .redirect_uri
        .join(uri.path_and_query().map_or("/", |pq| pq.as_str()))
        .map_err(AuthError::from)?;

    let client = PkceAuthClient::new(config, http_client, session.store.clone());
    let is_callback = client.auth_state(Some(&url)) == AuthState::CallbackPending;
    let page = client.load_page(&url).await;

    // The callback URL is single-use: send the browser back to the index so
    // that the code leaves the address bar and a reload doesn't replay it
    if is_callback {
        return Ok((session.into_jar(), Redirect::to("/")).into_response());
    }

    let html = templates.render_index(&IndexContext::from(&page))?;

    Ok((session.into_jar(), Html(html)).into_response())
}
