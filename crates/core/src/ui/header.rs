//! Header search and menu state.

use serde::{Deserialize, Serialize};

/// A search runs once the query is longer than this.
pub const MIN_SEARCH_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderState {
    pub search_query: String,
    pub search_focused: bool,
    pub notifications_open: bool,
    pub user_menu_open: bool,
}

impl HeaderState {
    /// Whether the current query is long enough to search.
    #[must_use]
    pub fn search_active(&self) -> bool {
        self.search_query.chars().count() > MIN_SEARCH_LEN
    }

    #[must_use]
    pub fn with_search(self, query: String) -> Self {
        Self {
            search_query: query,
            ..self
        }
    }

    /// Opening the notification panel closes the user menu.
    #[must_use]
    pub fn toggle_notifications(self) -> Self {
        let open = !self.notifications_open;
        Self {
            notifications_open: open,
            user_menu_open: self.user_menu_open && !open,
            ..self
        }
    }

    /// Opening the user menu closes the notification panel.
    #[must_use]
    pub fn toggle_user_menu(self) -> Self {
        let open = !self.user_menu_open;
        Self {
            user_menu_open: open,
            notifications_open: self.notifications_open && !open,
            ..self
        }
    }

    #[must_use]
    pub fn close_menus(self) -> Self {
        Self {
            notifications_open: false,
            user_menu_open: false,
            ..self
        }
    }

    #[must_use]
    pub fn focus_search(self) -> Self {
        Self {
            search_focused: true,
            ..self
        }
    }

    /// Escape: empty search, blur it, close both menus.
    #[must_use]
    pub fn dismiss(self) -> Self {
        Self {
            search_query: String::new(),
            search_focused: false,
            notifications_open: false,
            user_menu_open: false,
        }
    }
}
