// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use figment::{Figment, Profile};
use serde::de::DeserializeOwned;

/// A part of the configuration which can be loaded on its own, so that a
/// command like `authorize-url` doesn't need a full `http` section.
pub trait ConfigurationSection: Sized + DeserializeOwned {
    /// Key of the section in the configuration. `None` for the root.
    const PATH: Option<&'static str> = None;

    /// Check the values serde can't, like a domain being a valid host
    ///
    /// # Errors
    ///
    /// Returns an error pointing at the first invalid field
    fn validate(&self, _figment: &Figment) -> Result<(), figment::Error> {
        Ok(())
    }

    /// Deserialize the section from the merged configuration, then validate
    /// it
    ///
    /// # Errors
    ///
    /// Returns an error if the section is missing, malformed or invalid
    fn extract(figment: &Figment) -> Result<Self, figment::Error> {
        let this: Self = match Self::PATH {
            Some(path) => figment.extract_inner(path)?,
            None => figment.extract()?,
        };

        this.validate(figment)?;
        Ok(this)
    }
}

/// Point a validation error at `section.field`, with the metadata of the
/// file or environment variable which provided it
pub(crate) fn field_error(
    figment: &Figment,
    section: &str,
    field: &str,
    mut error: figment::Error,
) -> figment::Error {
    error.metadata = figment
        .find_metadata(&format!("{section}.{field}"))
        .or_else(|| figment.find_metadata(section))
        .cloned();
    error.profile = Some(Profile::Default);
    error.path = vec![section.to_owned(), field.to_owned()];
    error
}
