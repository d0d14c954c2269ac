// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Rendering of the pages, from templates embedded in the binary

use std::sync::Arc;

use minijinja::UndefinedBehavior;
use pkce_demo_oidc_client::Page;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

const INDEX_TEMPLATE: &str = "index.html";

/// Wrapper around [`minijinja::Environment`] rendering the pages
#[derive(Debug, Clone)]
pub struct Templates {
    environment: Arc<minijinja::Environment<'static>>,
}

/// Failed to load the templates
#[derive(Debug, Error)]
#[error("could not compile the templates")]
pub struct TemplateLoadingError(#[from] minijinja::Error);

/// Failed to render a template
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Missing template
    #[error("missing template {template:?}")]
    Missing {
        /// The name of the template being rendered
        template: &'static str,

        /// The underlying error
        #[source]
        source: minijinja::Error,
    },

    /// Failed to render the template
    #[error("could not render template {template:?}")]
    Render {
        /// The name of the template being rendered
        template: &'static str,

        /// The underlying error
        #[source]
        source: minijinja::Error,
    },
}

/// Context of the index page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexContext {
    logged_in: bool,
    user_data: Option<String>,
}

impl IndexContext {
    /// The context of the logged-out page
    #[must_use]
    pub fn logged_out() -> Self {
        Self {
            logged_in: false,
            user_data: None,
        }
    }
}

impl From<&Page> for IndexContext {
    fn from(page: &Page) -> Self {
        match page {
            Page::LoggedOut => Self::logged_out(),
            Page::LoggedIn { claims } => Self {
                logged_in: true,
                // Pretty-printed, in the order the provider sent them
                user_data: Some(format!("{:#}", Value::Object(claims.clone()))),
            },
        }
    }
}

impl Templates {
    /// Compile the embedded templates
    ///
    /// # Errors
    ///
    /// Returns an error if a template does not compile
    pub fn load() -> Result<Self, TemplateLoadingError> {
        let mut env = minijinja::Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.add_template(INDEX_TEMPLATE, include_str!("../templates/index.html"))?;

        tracing::debug!("Loaded templates");

        Ok(Self {
            environment: Arc::new(env),
        })
    }

    /// Render the index page
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_index(&self, context: &IndexContext) -> Result<String, TemplateError> {
        self.render(INDEX_TEMPLATE, context)
    }

    fn render<T: Serialize>(
        &self,
        template: &'static str,
        context: &T,
    ) -> Result<String, TemplateError> {
        let ctx = minijinja::value::Value::from_serialize(context);

        let tmpl = self
            .environment
            .get_template(template)
            .map_err(|source| TemplateError::Missing { template, source })?;
        tmpl.render(ctx)
            .map_err(|source| TemplateError::Render { template, source })
    }
}
