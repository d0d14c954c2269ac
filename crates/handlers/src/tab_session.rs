// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Tab-local storage, selected by a cookie.
//!
//! A tab is only registered while its store holds something: requests which
//! leave their store empty, like a logout or a visit without a cookie, don't
//! grow the registry.

use std::{
    collections::HashMap,
    convert::Infallible,
    sync::{Arc, Mutex, PoisonError},
    time::Instant,
};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use pkce_demo_oidc_client::MemorySessionStore;
use rand::RngCore;

/// Name of the cookie holding the tab session ID
pub const TAB_SESSION_COOKIE: &str = "tab_session";

/// How many tabs are kept before the least recently seen one is evicted
pub const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Debug)]
struct Entry {
    store: MemorySessionStore,
    last_seen: Instant,
}

#[derive(Debug)]
struct Inner {
    capacity: usize,
    entries: HashMap<String, Entry>,
}

/// The stores of every tab, by session ID
#[derive(Debug, Clone)]
pub struct TabSessions {
    inner: Arc<Mutex<Inner>>,
}

impl Default for TabSessions {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl TabSessions {
    /// Create an empty registry holding up to [`DEFAULT_CAPACITY`] tabs
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry holding up to `capacity` tabs
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                capacity: capacity.max(1),
                entries: HashMap::new(),
            })),
        }
    }

    /// Get the store of the session `id`, if it exists
    #[must_use]
    pub fn get(&self, id: &str) -> Option<MemorySessionStore> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = inner.entries.get_mut(id)?;
        entry.last_seen = Instant::now();
        Some(entry.store.clone())
    }

    /// Number of registered tabs
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    /// Whether no tab is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register or refresh the store of the session `id`, evicting the least
    /// recently seen tab when full
    fn insert(&self, id: &str, store: MemorySessionStore) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if !inner.entries.contains_key(id) && inner.entries.len() >= inner.capacity {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| id.clone());

            if let Some(oldest) = oldest {
                tracing::debug!("Too many tab sessions, evicting the least recently seen");
                inner.entries.remove(&oldest);
            }
        }

        inner.entries.insert(
            id.to_owned(),
            Entry {
                store,
                last_seen: Instant::now(),
            },
        );
    }

    fn remove(&self, id: &str) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .remove(id);
    }
}

fn new_session_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// The store of the tab making the request.
///
/// Handlers must send back the jar returned by [`TabSession::into_jar`], which
/// registers or forgets the tab depending on what its store holds.
#[derive(Debug)]
pub struct TabSession {
    /// The store of this tab
    pub store: MemorySessionStore,

    id: String,
    is_new: bool,
    had_cookie: bool,
    sessions: TabSessions,
    jar: CookieJar,
}

impl TabSession {
    /// Save the tab and get the cookies to send back.
    ///
    /// A tab with an empty store is dropped from the registry and its cookie
    /// removed. Otherwise the tab is registered, and a new tab gets its
    /// cookie.
    #[must_use]
    pub fn into_jar(self) -> CookieJar {
        if self.store.is_empty() {
            self.sessions.remove(&self.id);

            if self.had_cookie {
                return self
                    .jar
                    .remove(Cookie::build(TAB_SESSION_COOKIE).path("/"));
            }

            return self.jar;
        }

        self.sessions.insert(&self.id, self.store.clone());

        if !self.is_new {
            return self.jar;
        }

        tracing::debug!("Starting a new tab session");
        let cookie = Cookie::build((TAB_SESSION_COOKIE, self.id))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);

        self.jar.add(cookie)
    }
}

impl<S> FromRequestParts<S> for TabSession
where
    S: Send + Sync,
    TabSessions: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = TabSessions::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie_value = jar
            .get(TAB_SESSION_COOKIE)
            .map(|cookie| cookie.value().to_owned());
        let had_cookie = cookie_value.is_some();

        if let Some((id, store)) = cookie_value
            .and_then(|id| sessions.get(&id).map(|store| (id, store)))
        {
            return Ok(Self {
                store,
                id,
                is_new: false,
                had_cookie,
                sessions,
                jar,
            });
        }

        // Unknown IDs are not reused, so that a session ID is always one we
        // generated
        Ok(Self {
            store: MemorySessionStore::new(),
            id: new_session_id(),
            is_new: true,
            had_cookie,
            sessions,
            jar,
        })
    }
}
