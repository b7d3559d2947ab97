//! Per-request page pipeline.
//!
//! Each page view runs the same stages in order: restore the session,
//! resolve the layout, set the chat context, then build navigation. The
//! result is a [`PageFrame`] that the renderer turns into chrome.

use serde::Serialize;

use crate::input::{InputDispatcher, ShortcutTable};
use crate::layout::{Chrome, LayoutRequest, LayoutTable, LayoutVariant, QueryFlags};
use crate::navigation::{NavigationEntry, NavigationTable, is_current_page};
use crate::session::{KeyValueStore, RestoreOutcome, SessionStore};
use crate::types::Identity;
use crate::ui::{UiAction, UiState};

/// One page navigation as seen by the server.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub path: String,
    pub flags: QueryFlags,
    /// The page is being loaded inside another document.
    pub embedded_frame: bool,
}

impl PageRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            flags: QueryFlags::default(),
            embedded_frame: false,
        }
    }

    #[must_use]
    pub const fn with_flags(mut self, flags: QueryFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub const fn embedded(mut self, embedded: bool) -> Self {
        self.embedded_frame = embedded;
        self
    }
}

/// A sidebar item ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    #[serde(flatten)]
    pub entry: NavigationEntry,
    pub active: bool,
}

/// Everything needed to render the chrome around a page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageFrame {
    pub path: String,
    pub identity: Option<Identity>,
    #[serde(skip)]
    pub restore: RestoreOutcome,
    pub chrome: Chrome,
    pub body_class: String,
    /// Set when an anonymous visitor must be sent to the login page.
    pub redirect: Option<&'static str>,
    pub chat_context: String,
    pub navigation: Vec<NavItem>,
    pub shortcuts: ShortcutTable,
}

impl PageFrame {
    #[must_use]
    pub const fn variant(&self) -> LayoutVariant {
        self.chrome.variant
    }
}

/// Static tables shared by every request.
#[derive(Debug, Clone, Copy)]
pub struct AppShell<'a> {
    layouts: &'a LayoutTable,
    navigation: &'a NavigationTable,
}

impl Default for AppShell<'static> {
    fn default() -> Self {
        Self::new(LayoutTable::standard(), NavigationTable::standard())
    }
}

impl<'a> AppShell<'a> {
    #[must_use]
    pub const fn new(layouts: &'a LayoutTable, navigation: &'a NavigationTable) -> Self {
        Self {
            layouts,
            navigation,
        }
    }

    #[must_use]
    pub const fn layouts(&self) -> &'a LayoutTable {
        self.layouts
    }

    #[must_use]
    pub const fn navigation(&self) -> &'a NavigationTable {
        self.navigation
    }

    #[must_use]
    pub fn dispatcher(&self) -> InputDispatcher {
        InputDispatcher::new(ShortcutTable::from_navigation(self.navigation))
    }

    /// Run restore, resolve, contextualise and navigate for one request.
    ///
    /// Returns the frame to render and the updated UI state.
    pub fn run<S: KeyValueStore>(
        &self,
        session: &mut SessionStore<S>,
        ui: UiState,
        request: &PageRequest,
    ) -> (PageFrame, UiState) {
        let restore = session.restore();
        let authenticated = session.is_authenticated();

        let variant = self.layouts.resolve(&LayoutRequest {
            path: &request.path,
            flags: request.flags,
            embedded_frame: request.embedded_frame,
            authenticated,
        });
        let redirect = self.layouts.login_redirect(&request.path, authenticated);

        let chat_context = self.layouts.chat_context(&request.path).to_owned();
        let ui = ui
            .reduce(UiAction::SetLayoutVariant { variant })
            .reduce(UiAction::SetChatContext {
                context: chat_context.clone(),
            });

        let navigation = session
            .identity()
            .map(|identity| self.navigation.visible_entries(identity.role))
            .unwrap_or_default()
            .into_iter()
            .map(|entry| NavItem {
                active: is_current_page(&entry.path, &request.path)
                    || entry
                        .children
                        .iter()
                        .any(|child| is_current_page(&child.path, &request.path)),
                entry: entry.clone(),
            })
            .collect();

        tracing::debug!(
            path = %request.path,
            layout = %variant,
            authenticated,
            ?restore,
            "page resolved"
        );

        let frame = PageFrame {
            path: request.path.clone(),
            identity: session.identity().cloned(),
            restore,
            chrome: variant.chrome(),
            body_class: variant.body_classes(),
            redirect,
            chat_context,
            navigation,
            shortcuts: ShortcutTable::from_navigation(self.navigation),
        };

        (frame, ui)
    }
}
