// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use serde::Serialize;
use url::Url;

/// Add the serialized parameters to the query of the URL, after the ones it
/// might already have.
pub fn append_query<T: Serialize>(
    mut url: Url,
    params: &T,
) -> Result<Url, serde_urlencoded::ser::Error> {
    let query = serde_urlencoded::to_string(params)?;

    let mut full_query = url.query().map(ToOwned::to_owned).unwrap_or_default();
    if !full_query.is_empty() {
        full_query.push('&');
    }
    full_query.push_str(&query);

    url.set_query(Some(&full_query));

    Ok(url)
}
