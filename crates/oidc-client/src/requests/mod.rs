// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Methods to interact with the OAuth 2.0 endpoints of the provider.

pub mod authorization_code;
pub mod logout;
pub mod token;
pub mod userinfo;
