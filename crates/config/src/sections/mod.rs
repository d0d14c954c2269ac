// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod http;
mod provider;

pub use self::{http::HttpConfig, provider::ProviderConfig};
use crate::util::ConfigurationSection;

/// Application configuration root
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RootConfig {
    /// Configuration of the HTTP server
    #[serde(default)]
    pub http: HttpConfig,

    /// Configuration of the identity provider and of this client
    pub provider: ProviderConfig,
}

impl ConfigurationSection for RootConfig {
    fn validate(&self, figment: &figment::Figment) -> Result<(), figment::Error> {
        self.http.validate(figment)?;
        self.provider.validate(figment)?;

        Ok(())
    }
}

impl RootConfig {
    /// Generate a sample configuration, to be filled with the values of the
    /// app client registered at the provider
    #[must_use]
    pub fn generate() -> Self {
        Self {
            http: HttpConfig::default(),
            provider: ProviderConfig::generate(),
        }
    }

    /// Configuration used in tests
    #[must_use]
    pub fn test() -> Self {
        Self {
            http: HttpConfig::default(),
            provider: ProviderConfig::test(),
        }
    }
}
