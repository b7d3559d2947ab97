//! Visitor extractor bridging the HTTP session to the core session store.
//!
//! The identity keys and the UI state live in the visitor's tower session.
//! On extraction they are copied into a core [`MemoryStore`]; handlers run
//! the pure session and UI logic against that copy, and [`Visitor::commit`]
//! writes back only the values that changed.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde_json::Value;
use tower_sessions::Session;

use arioncomply_core::session::{SESSION_KEY, USER_KEY};
use arioncomply_core::{
    AppShell, Identity, KeyValueStore, MemoryStore, PageFrame, PageRequest, RestoreOutcome,
    SessionStore, UiState,
};

use crate::error::{AppError, clear_sentry_user, set_sentry_user};

/// Session key holding the serialized [`UiState`].
pub const UI_STATE_KEY: &str = "ui_state";

/// Marker left after an explicit sign-out. Any marker other than the active
/// one keeps the visitor logged out instead of reinstalling the demo user.
pub const SIGNED_OUT_MARKER: &str = "signed_out";

const IDENTITY_KEYS: [&str; 2] = [SESSION_KEY, USER_KEY];

/// The current visitor: identity store plus UI state.
pub struct Visitor {
    session: Session,
    loaded: MemoryStore,
    store: SessionStore<MemoryStore>,
    loaded_ui: Option<UiState>,
    ui: UiState,
}

impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))?;

        Self::load(session).await
    }
}

impl Visitor {
    /// Read the identity keys and UI state out of `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn load(session: Session) -> Result<Self, AppError> {
        let mut loaded = MemoryStore::new();
        for key in IDENTITY_KEYS {
            if let Some(value) = session.get_value(key).await? {
                loaded.set(key, stored_string(value));
            }
        }

        let loaded_ui = match session.get_value(UI_STATE_KEY).await? {
            Some(value) => match serde_json::from_value::<UiState>(value) {
                Ok(ui) => Some(ui),
                Err(e) => {
                    tracing::warn!(error = %e, "discarding persisted UI state");
                    None
                }
            },
            None => None,
        };
        let ui = loaded_ui.clone().unwrap_or_default();

        Ok(Self {
            session,
            store: SessionStore::new(loaded.clone()),
            loaded,
            loaded_ui,
            ui,
        })
    }

    /// Restore the identity (installing the demo identity when needed).
    pub fn restore(&mut self) -> RestoreOutcome {
        self.store.restore()
    }

    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.store.identity()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// The core session store, for login, logout and profile updates.
    pub const fn sessions(&mut self) -> &mut SessionStore<MemoryStore> {
        &mut self.store
    }

    #[must_use]
    pub const fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Clear the identity and keep the visitor logged out.
    pub fn sign_out(&mut self) {
        self.store.clear();
        self.store
            .store_mut()
            .set(SESSION_KEY, SIGNED_OUT_MARKER.to_string());
    }

    pub fn set_ui(&mut self, ui: UiState) {
        self.ui = ui;
    }

    /// Run the page pipeline for this visitor.
    pub fn run_page(&mut self, shell: &AppShell<'_>, request: &PageRequest) -> PageFrame {
        let ui = std::mem::take(&mut self.ui);
        let (frame, ui) = shell.run(&mut self.store, ui, request);
        self.ui = ui;
        frame
    }

    /// Write changed values back to the HTTP session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn commit(self) -> Result<(), AppError> {
        let current = self.store.store();
        for key in IDENTITY_KEYS {
            let after = current.get(key);
            if after == self.loaded.get(key) {
                continue;
            }
            match after {
                Some(value) => self.session.insert(key, value).await?,
                None => {
                    self.session.remove_value(key).await?;
                }
            }
        }

        if self.loaded_ui.as_ref() != Some(&self.ui) {
            self.session.insert(UI_STATE_KEY, &self.ui).await?;
        }

        match self.store.identity() {
            Some(identity) => set_sentry_user(identity.id.as_str(), Some(identity.email.as_str())),
            None => clear_sentry_user(),
        }

        Ok(())
    }

    /// Issue a fresh session id, keeping the data. Used on login.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn cycle_id(&self) -> Result<(), AppError> {
        self.session.cycle_id().await?;
        Ok(())
    }
}

/// Stored identity values are strings; anything else is kept as its JSON
/// text so the restore step treats it as malformed.
fn stored_string(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use arioncomply_core::session::ACTIVE_MARKER;
    use arioncomply_core::{LayoutVariant, Role, UiAction};
    use tower_sessions::MemoryStore as SessionMemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(SessionMemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_fresh_session_installs_demo_and_commits_it() {
        let session = session();
        let mut visitor = Visitor::load(session.clone()).await.unwrap();
        assert_eq!(visitor.restore(), RestoreOutcome::DemoInstalled);
        visitor.commit().await.unwrap();

        let marker: Option<String> = session.get(SESSION_KEY).await.unwrap();
        assert_eq!(marker.as_deref(), Some(ACTIVE_MARKER));
        let blob: Option<String> = session.get(USER_KEY).await.unwrap();
        let identity: Identity = serde_json::from_str(&blob.unwrap()).unwrap();
        assert_eq!(identity.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_logout_removes_keys() {
        let session = session();
        let mut visitor = Visitor::load(session.clone()).await.unwrap();
        visitor.restore();
        visitor.commit().await.unwrap();

        let mut visitor = Visitor::load(session.clone()).await.unwrap();
        assert_eq!(visitor.restore(), RestoreOutcome::Restored);
        visitor.sessions().clear();
        visitor.commit().await.unwrap();

        assert!(session.get_value(SESSION_KEY).await.unwrap().is_none());
        assert!(session.get_value(USER_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_stays_signed_out() {
        let session = session();
        let mut visitor = Visitor::load(session.clone()).await.unwrap();
        visitor.restore();
        visitor.sign_out();
        visitor.commit().await.unwrap();

        let mut visitor = Visitor::load(session.clone()).await.unwrap();
        assert_eq!(visitor.restore(), RestoreOutcome::LoggedOut);
        assert!(!visitor.is_authenticated());
        assert!(session.get_value(USER_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_string_identity_value_falls_back_to_demo() {
        let session = session();
        session.insert(SESSION_KEY, ACTIVE_MARKER).await.unwrap();
        session.insert(USER_KEY, 42).await.unwrap();

        let mut visitor = Visitor::load(session).await.unwrap();
        assert_eq!(visitor.restore(), RestoreOutcome::DemoInstalled);
        assert_eq!(visitor.identity().unwrap().id.as_str(), Identity::DEMO_ID);
    }

    #[tokio::test]
    async fn test_ui_state_round_trips_through_session() {
        let session = session();
        let mut visitor = Visitor::load(session.clone()).await.unwrap();
        let ui = visitor.ui().clone().reduce(UiAction::ToggleSidebar);
        visitor.set_ui(ui);
        visitor.commit().await.unwrap();

        let visitor = Visitor::load(session).await.unwrap();
        assert!(visitor.ui().layout.sidebar_open);
    }

    #[tokio::test]
    async fn test_corrupt_ui_state_is_replaced() {
        let session = session();
        session.insert(UI_STATE_KEY, "not a state").await.unwrap();

        let visitor = Visitor::load(session).await.unwrap();
        assert_eq!(visitor.ui().layout.variant, LayoutVariant::FullApp);
    }
}
