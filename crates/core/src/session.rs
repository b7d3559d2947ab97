//! Session identity persisted in a key-value store.
//!
//! Two keys are used:
//!
//! | key                   | value                       |
//! |-----------------------|-----------------------------|
//! | `arioncomply_session` | the literal marker `active` |
//! | `arioncomply_user`    | the identity as JSON        |
//!
//! The console backs the store with the visitor's HTTP session; tests and
//! the CLI use [`MemoryStore`].

use std::collections::HashMap;

use crate::types::{Identity, IdentityError, IdentityPatch};

pub const SESSION_KEY: &str = "arioncomply_session";
pub const USER_KEY: &str = "arioncomply_user";
pub const ACTIVE_MARKER: &str = "active";

/// Minimal string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-process [`KeyValueStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store, e.g. from values loaded out of an HTTP session.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_owned(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) {
        (**self).set(key, value);
    }

    fn remove(&mut self, key: &str) {
        (**self).remove(key);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("invalid identity: {0}")]
    InvalidIdentity(#[from] IdentityError),
    #[error("failed to encode identity: {0}")]
    Encode(#[from] serde_json::Error),
}

/// What [`SessionStore::restore`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A valid persisted identity was loaded.
    Restored,
    /// Nothing usable was persisted; the demo identity was installed.
    DemoInstalled,
    /// A non-active marker is present: the visitor stays logged out.
    LoggedOut,
}

/// The current identity plus its persisted mirror.
#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    store: S,
    identity: Option<Identity>,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Wrap a store. Nothing is read until [`restore`](Self::restore).
    pub const fn new(store: S) -> Self {
        Self {
            store,
            identity: None,
        }
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Load the persisted identity.
    ///
    /// A missing marker, or an active marker whose blob is missing or
    /// malformed, installs and persists the demo identity. A marker with any
    /// other value leaves the visitor logged out.
    pub fn restore(&mut self) -> RestoreOutcome {
        match self.store.get(SESSION_KEY).as_deref() {
            Some(ACTIVE_MARKER) => {}
            Some(other) => {
                tracing::debug!(marker = other, "session marker not active");
                self.identity = None;
                return RestoreOutcome::LoggedOut;
            }
            None => {
                self.install_demo();
                return RestoreOutcome::DemoInstalled;
            }
        }

        let Some(blob) = self.store.get(USER_KEY) else {
            self.install_demo();
            return RestoreOutcome::DemoInstalled;
        };

        match decode(&blob) {
            Ok(identity) => {
                self.identity = Some(identity);
                RestoreOutcome::Restored
            }
            Err(reason) => {
                tracing::warn!(%reason, "discarding persisted identity");
                self.install_demo();
                RestoreOutcome::DemoInstalled
            }
        }
    }

    /// Log in as `identity`.
    ///
    /// # Errors
    ///
    /// Rejects a structurally invalid identity without touching any state.
    pub fn set(&mut self, identity: Identity) -> Result<(), SessionStoreError> {
        identity.validate()?;
        let blob = serde_json::to_string(&identity)?;

        self.store.set(USER_KEY, blob);
        self.store.set(SESSION_KEY, ACTIVE_MARKER.to_owned());
        self.identity = Some(identity);
        Ok(())
    }

    /// Log out, removing both persisted keys.
    pub fn clear(&mut self) {
        self.identity = None;
        self.store.remove(SESSION_KEY);
        self.store.remove(USER_KEY);
    }

    /// Merge a partial update into the current identity.
    ///
    /// Returns `Ok(false)` when logged out.
    ///
    /// # Errors
    ///
    /// Rejects a patch that would make the identity invalid.
    pub fn update(&mut self, patch: IdentityPatch) -> Result<bool, SessionStoreError> {
        let Some(current) = self.identity.clone() else {
            return Ok(false);
        };
        self.set(current.merged(patch))?;
        Ok(true)
    }

    /// Re-read the persisted state without the demo fallback, picking up
    /// changes made through another handle on the same store.
    pub fn refresh(&mut self) -> bool {
        let active = self.store.get(SESSION_KEY).as_deref() == Some(ACTIVE_MARKER);
        self.identity = if active {
            self.store.get(USER_KEY).and_then(|blob| decode(&blob).ok())
        } else {
            None
        };
        self.is_authenticated()
    }

    fn install_demo(&mut self) {
        let demo = Identity::demo();
        if let Err(err) = self.set(demo.clone()) {
            tracing::error!(error = %err, "failed to persist demo identity");
            self.identity = Some(demo);
        }
    }
}

fn decode(blob: &str) -> Result<Identity, String> {
    let identity: Identity = serde_json::from_str(blob).map_err(|e| e.to_string())?;
    identity.validate().map_err(|e| e.to_string())?;
    Ok(identity)
}
