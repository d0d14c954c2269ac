// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use anyhow::Context;
use pkce_demo_config::ProviderConfig;
use pkce_demo_handlers::Templates;
use pkce_demo_oidc_client::ClientConfig;

pub fn client_config_from_config(config: &ProviderConfig) -> Result<ClientConfig, anyhow::Error> {
    let issuer = config
        .base_url()
        .context("the provider needs either a valid `domain` or an `issuer`")?;

    let client_config = ClientConfig::new(
        issuer,
        config.client_id.clone(),
        config.redirect_uri.clone(),
        config.scope.clone(),
        config.logout_uri.clone(),
    );

    // Catch URLs which can't be joined as early as possible
    client_config
        .authorization_endpoint()
        .and_then(|_| client_config.token_endpoint())
        .and_then(|_| client_config.userinfo_endpoint())
        .and_then(|_| client_config.logout_endpoint())
        .context("could not derive the provider endpoints")?;

    Ok(client_config)
}

pub fn templates_from_config() -> Result<Templates, anyhow::Error> {
    Templates::load().context("could not load the templates")
}
