// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use figment::Figment;
use pkce_demo_config::{ConfigurationSection, RootConfig};
use pkce_demo_handlers::{AppState, TabSessions};
use tracing::{Instrument, info, info_span};

use crate::{
    server::build_router,
    shutdown::ShutdownManager,
    util::{client_config_from_config, templates_from_config},
};

#[derive(Parser, Debug, Default)]
pub(super) struct Options {}

impl Options {
    pub async fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        let span = info_span!("cli.run.init").entered();
        let shutdown = ShutdownManager::new()?;
        let config = RootConfig::extract(figment)?;

        info!(version = crate::VERSION, "Starting up");

        let client_config = client_config_from_config(&config.provider)?;
        info!(
            issuer = %client_config.issuer,
            client_id = %client_config.client_id,
            "Using identity provider"
        );

        let state = AppState {
            client_config,
            http_client: pkce_demo_http::reqwest_client(),
            sessions: TabSessions::new(),
            templates: templates_from_config()?,
        };

        let router = build_router(state);

        let listener = tokio::net::TcpListener::bind(config.http.listen)
            .await
            .with_context(|| format!("could not bind to {}", config.http.listen))?;
        let local_addr = listener.local_addr()?;

        let soft_shutdown_token = shutdown.soft_shutdown_token();
        let hard_shutdown_token = shutdown.hard_shutdown_token();
        shutdown.task_tracker().spawn(
            async move {
                let server = axum::serve(listener, router)
                    .with_graceful_shutdown(soft_shutdown_token.cancelled_owned())
                    .into_future();

                tokio::select! {
                    result = server => {
                        if let Err(err) = result {
                            tracing::error!(
                                error = &err as &dyn std::error::Error,
                                "Server failed"
                            );
                        }
                    },
                    () = hard_shutdown_token.cancelled() => {
                        tracing::warn!("Dropping the connections still open");
                    },
                }
            }
            .instrument(info_span!("http.server", %local_addr)),
        );

        info!("Listening on http://{local_addr}/");

        span.exit();

        shutdown.run().await;

        Ok(ExitCode::SUCCESS)
    }
}
