// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Tab-local storage of the login flow.
//!
//! The store lives as long as the browser tab: it is shared by the login
//! redirect and the callback, and is never shared between tabs.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

/// Key of the access token obtained at the end of the flow.
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Key of the `state` sent with the pending authorization request.
pub const PKCE_STATE_KEY: &str = "pkce_state";

/// Key of the code verifier of the pending authorization request.
pub const PKCE_CODE_VERIFIER_KEY: &str = "pkce_code_verifier";

/// A string key/value store scoped to a browser tab.
pub trait SessionStore: Send + Sync {
    /// Get the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String);

    /// Remove the value stored under `key`, if any.
    fn delete(&self, key: &str);

    /// Remove every value.
    fn clear(&self);
}

impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) {
        (**self).set(key, value);
    }

    fn delete(&self, key: &str) {
        (**self).delete(key);
    }

    fn clear(&self) {
        (**self).clear();
    }
}

/// An in-memory [`SessionStore`]. Clones share the same entries.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the store has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // The map is always left consistent, so a poisoned lock is still usable
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.lock().insert(key.to_owned(), value);
    }

    fn delete(&self, key: &str) {
        self.lock().remove(key);
    }

    fn clear(&self) {
        self.lock().clear();
    }
}

impl std::fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self.lock();
        let mut keys: Vec<&str> = entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("MemorySessionStore")
            .field("keys", &keys)
            .finish()
    }
}
