// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::collections::HashMap;

use pkce_demo_oidc_client::requests::logout::{LogoutData, build_logout_url};
use url::Url;

use crate::{CLIENT_ID, LOGOUT_URI};

#[test]
fn build_url() {
    let logout_endpoint = Url::parse("https://localhost/logout").unwrap();
    let logout_data = LogoutData {
        client_id: CLIENT_ID.to_owned(),
        logout_uri: Url::parse(LOGOUT_URI).unwrap(),
    };

    let url = build_logout_url(logout_endpoint, &logout_data).unwrap();

    assert_eq!(url.path(), "/logout");

    let query_pairs = url.query_pairs().collect::<HashMap<_, _>>();
    assert_eq!(query_pairs.get("client_id").unwrap(), CLIENT_ID);
    assert_eq!(query_pairs.get("logout_uri").unwrap(), LOGOUT_URI);
    assert_eq!(query_pairs.len(), 2);
}

#[test]
fn build_url_encodes_parameters() {
    let logout_endpoint = Url::parse("https://localhost/logout").unwrap();
    let logout_data = LogoutData {
        client_id: CLIENT_ID.to_owned(),
        logout_uri: Url::parse("http://localhost:8080/?signed_out=1").unwrap(),
    };

    let url = build_logout_url(logout_endpoint, &logout_data).unwrap();

    assert_eq!(
        url.query(),
        Some("client_id=client%21%2BID&logout_uri=http%3A%2F%2Flocalhost%3A8080%2F%3Fsigned_out%3D1")
    );
}
