// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::Error as _};
use url::Url;

use super::ConfigurationSection;
use crate::util::field_error;

fn default_scope() -> String {
    "openid profile email".to_owned()
}

/// Configuration of the hosted identity provider, and of the app client
/// registered there
///
/// The client is public: it has no secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProviderConfig {
    /// Domain of the hosted UI, like
    /// `example.auth.us-east-1.amazoncognito.com`.
    ///
    /// The provider endpoints are served over HTTPS below this domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<crate::schema::Hostname>")]
    pub domain: Option<String>,

    /// Base URL of the provider, overriding the one derived from `domain`.
    ///
    /// Useful for providers which are not served at the root of a domain,
    /// or over plain HTTP in development.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<crate::schema::HttpUrl>")]
    pub issuer: Option<Url>,

    /// The ID of the app client
    pub client_id: String,

    /// The URI the provider redirects to after the login. It must be one of
    /// the callback URLs registered for the app client
    #[schemars(with = "crate::schema::HttpUrl")]
    pub redirect_uri: Url,

    /// The space-separated scope to request
    #[serde(default = "default_scope")]
    pub scope: String,

    /// The URI the provider redirects to after the logout. It must be one of
    /// the sign-out URLs registered for the app client
    #[schemars(with = "crate::schema::HttpUrl")]
    pub logout_uri: Url,
}

impl ProviderConfig {
    /// The base URL of the provider: `issuer` if set, else
    /// `https://<domain>/`.
    ///
    /// Returns `None` if neither is set, or the domain is not a valid host.
    #[must_use]
    pub fn base_url(&self) -> Option<Url> {
        if let Some(issuer) = &self.issuer {
            return Some(issuer.clone());
        }

        let domain = self.domain.as_deref()?;
        Url::parse(&format!("https://{domain}/"))
            .ok()
            .filter(|url| url.host_str() == Some(domain))
    }

    pub(crate) fn generate() -> Self {
        Self {
            domain: Some("example.auth.us-east-1.amazoncognito.com".to_owned()),
            issuer: None,
            client_id: "CHANGE_ME".to_owned(),
            redirect_uri: Url::parse("http://localhost:8080/callback")
                .expect("valid default redirect URI"),
            scope: default_scope(),
            logout_uri: Url::parse("http://localhost:8080/").expect("valid default logout URI"),
        }
    }

    pub(crate) fn test() -> Self {
        Self {
            domain: None,
            issuer: Some(Url::parse("http://localhost:1234/").expect("valid test issuer")),
            client_id: "test-client".to_owned(),
            redirect_uri: Url::parse("http://localhost:8080/callback")
                .expect("valid test redirect URI"),
            scope: default_scope(),
            logout_uri: Url::parse("http://localhost:8080/").expect("valid test logout URI"),
        }
    }
}

impl ConfigurationSection for ProviderConfig {
    const PATH: Option<&'static str> = Some("provider");

    fn validate(&self, figment: &figment::Figment) -> Result<(), figment::Error> {
        let section = Self::PATH.unwrap_or_default();
        let error_on_field =
            |error: figment::Error, field: &str| field_error(figment, section, field, error);

        if self.domain.is_none() && self.issuer.is_none() {
            return Err(error_on_field(
                figment::Error::missing_field("domain"),
                "domain",
            ));
        }

        if self.base_url().is_none() {
            return Err(error_on_field(
                figment::Error::from(format!(
                    "{:?} is not a valid domain",
                    self.domain.as_deref().unwrap_or_default()
                )),
                "domain",
            ));
        }

        if self.client_id.is_empty() {
            return Err(error_on_field(
                figment::Error::from("must not be empty".to_owned()),
                "client_id",
            ));
        }

        for (field, url) in [
            ("redirect_uri", &self.redirect_uri),
            ("logout_uri", &self.logout_uri),
        ] {
            if !matches!(url.scheme(), "http" | "https") {
                return Err(error_on_field(
                    figment::Error::from(format!(
                        "unsupported scheme {:?}, expected http or https",
                        url.scheme()
                    )),
                    field,
                ));
            }
        }

        Ok(())
    }
}
