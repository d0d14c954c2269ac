// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Schemas of the string fields which are checked beyond their type

use schemars::{
    JsonSchema,
    r#gen::SchemaGenerator,
    schema::{InstanceType, Schema, SchemaObject},
};

fn formatted_string(format: &str, pattern: Option<&str>) -> Schema {
    let mut schema = SchemaObject {
        instance_type: Some(InstanceType::String.into()),
        format: Some(format.to_owned()),
        ..SchemaObject::default()
    };

    if let Some(pattern) = pattern {
        schema.string().pattern = Some(pattern.to_owned());
    }

    schema.into()
}

/// The domain of a hosted identity provider, without scheme or path
pub struct Hostname;

impl JsonSchema for Hostname {
    fn schema_name() -> String {
        "Hostname".to_owned()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        formatted_string("hostname", None)
    }
}

/// An absolute `http` or `https` URL the browser gets sent to
pub struct HttpUrl;

impl JsonSchema for HttpUrl {
    fn schema_name() -> String {
        "HttpUrl".to_owned()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        formatted_string("uri", Some("^https?://"))
    }
}
