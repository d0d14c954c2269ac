// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use figment::Figment;
use pkce_demo_config::{ConfigurationSection, ProviderConfig};
use pkce_demo_oidc_client::{
    ClientConfig,
    requests::authorization_code::{
        AuthorizationRequestData, AuthorizationValidationData, build_authorization_url,
    },
};
use rand::SeedableRng;
use tokio::io::AsyncWriteExt;
use tracing::info_span;
use url::Url;

use crate::util::client_config_from_config;

#[derive(Parser, Debug)]
pub(super) struct Options {
    /// Seed the random generator, to get the same URL on every run
    ///
    /// Only use this for debugging: the state and code verifier become
    /// predictable.
    #[arg(long)]
    seed: Option<u64>,
}

fn authorize_url(
    client_config: &ClientConfig,
    rng: &mut rand_chacha::ChaChaRng,
) -> anyhow::Result<(Url, AuthorizationValidationData)> {
    let endpoint = client_config
        .authorization_endpoint()
        .context("invalid authorize endpoint")?;

    let result = build_authorization_url(
        endpoint,
        AuthorizationRequestData::new(
            client_config.client_id.clone(),
            client_config.scope.clone(),
            client_config.redirect_uri.clone(),
        ),
        rng,
    )?;

    Ok(result)
}

impl Options {
    pub async fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        let _span = info_span!("cli.authorize_url").entered();

        let config = ProviderConfig::extract(figment)?;
        let client_config = client_config_from_config(&config)?;

        let mut rng = match self.seed {
            Some(seed) => rand_chacha::ChaChaRng::seed_from_u64(seed),
            None => rand_chacha::ChaChaRng::from_entropy(),
        };

        let (url, validation_data) = authorize_url(&client_config, &mut rng)?;

        let output = format!(
            "url: {url}\nstate: {}\ncode_verifier: {}\n",
            validation_data.state, validation_data.code_verifier
        );
        tokio::io::stdout().write_all(output.as_bytes()).await?;

        Ok(ExitCode::SUCCESS)
    }
}
