// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use pkce_demo_oidc_client::{ClientConfig, PkceAuthClient};

use super::RouteError;
use crate::tab_session::TabSession;

#[tracing::instrument(name = "handlers.views.login.get", skip_all)]
pub(crate) async fn get(
    session: TabSession,
    State(config): State<ClientConfig>,
    State(http_client): State<reqwest::Client>,
) -> Result<impl IntoResponse, RouteError> {
    let client = PkceAuthClient::new(config, http_client, session.store.clone());

    let url = {
        let mut rng = rand::thread_rng();
        client.login(&mut rng)?
    };

    Ok((session.into_jar(), Redirect::temporary(url.as_str())))
}
