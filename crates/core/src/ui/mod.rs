//! Client UI state and its reducer.
//!
//! State is a plain value; every change goes through [`UiState::reduce`]
//! (for explicit actions) or [`UiState::apply`] (for keyboard commands).

pub mod chat;
pub mod header;
pub mod layout;
pub mod notifications;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use chat::{ChatMessage, ChatRole, ChatState};
pub use header::HeaderState;
pub use layout::{LayoutState, MOBILE_BREAKPOINT};
pub use notifications::{Notification, NotificationKind, NotificationState};

use crate::input::Command;
use crate::layout::LayoutVariant;
use crate::types::NotificationId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub layout: LayoutState,
    pub header: HeaderState,
    pub chat: ChatState,
    pub notifications: NotificationState,
}

impl Default for UiState {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

/// A state transition requested by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiAction {
    ToggleSidebar,
    OpenSidebar,
    CloseSidebar,
    SetLayoutVariant { variant: LayoutVariant },
    SetViewportWidth { width: u32 },

    SetSearchQuery { query: String },
    ToggleNotifications,
    ToggleUserMenu,
    CloseMenus,

    ToggleChat,
    OpenChat,
    CloseChat,
    SetChatContext { context: String },
    AddChatMessage { role: ChatRole, content: String },
    ClearChatMessages,
    SetChatLoading { loading: bool },

    AddNotification {
        title: String,
        message: String,
        #[serde(default)]
        kind: NotificationKind,
        #[serde(default)]
        icon: Option<String>,
    },
    MarkNotificationRead { id: NotificationId },
    MarkAllNotificationsRead,
    RemoveNotification { id: NotificationId },
    ClearNotifications,
}

impl UiState {
    /// Fresh state with the demo notifications timed relative to `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            layout: LayoutState::default(),
            header: HeaderState::default(),
            chat: ChatState::default(),
            notifications: NotificationState::seeded(now),
        }
    }

    #[must_use]
    pub fn reduce(self, action: UiAction) -> Self {
        self.reduce_at(action, Utc::now())
    }

    /// [`reduce`](Self::reduce) with an explicit clock for new items.
    #[must_use]
    pub fn reduce_at(mut self, action: UiAction, now: DateTime<Utc>) -> Self {
        match action {
            UiAction::ToggleSidebar => self.layout = self.layout.toggle_sidebar(),
            UiAction::OpenSidebar => self.layout = self.layout.with_sidebar(true),
            UiAction::CloseSidebar => self.layout = self.layout.with_sidebar(false),
            UiAction::SetLayoutVariant { variant } => {
                self.layout = self.layout.with_variant(variant);
            }
            UiAction::SetViewportWidth { width } => {
                self.layout = self.layout.with_viewport_width(width);
            }

            UiAction::SetSearchQuery { query } => self.header = self.header.with_search(query),
            UiAction::ToggleNotifications => self.header = self.header.toggle_notifications(),
            UiAction::ToggleUserMenu => self.header = self.header.toggle_user_menu(),
            UiAction::CloseMenus => self.header = self.header.close_menus(),

            UiAction::ToggleChat => {
                let open = !self.chat.open;
                self.chat = self.chat.with_open(open);
            }
            UiAction::OpenChat => self.chat = self.chat.with_open(true),
            UiAction::CloseChat => self.chat = self.chat.with_open(false),
            UiAction::SetChatContext { context } => self.chat = self.chat.with_context(context),
            UiAction::AddChatMessage { role, content } => {
                self.chat = self.chat.push(role, content, now);
            }
            UiAction::ClearChatMessages => self.chat = self.chat.cleared(),
            UiAction::SetChatLoading { loading } => self.chat = self.chat.with_loading(loading),

            UiAction::AddNotification {
                title,
                message,
                kind,
                icon,
            } => {
                self.notifications = self.notifications.add(title, message, kind, icon, now);
            }
            UiAction::MarkNotificationRead { id } => {
                self.notifications = self.notifications.mark_read(&id);
            }
            UiAction::MarkAllNotificationsRead => {
                self.notifications = self.notifications.mark_all_read();
            }
            UiAction::RemoveNotification { id } => {
                self.notifications = self.notifications.remove(&id);
            }
            UiAction::ClearNotifications => self.notifications = self.notifications.cleared(),
        }
        self
    }

    /// Apply a dispatched keyboard command.
    ///
    /// Navigation itself is the caller's job; here it only closes transient
    /// chrome (the sidebar too, on mobile).
    #[must_use]
    pub fn apply(self, command: &Command) -> Self {
        match command {
            Command::Navigate { .. } => Self {
                layout: if self.layout.is_mobile {
                    self.layout.with_sidebar(false)
                } else {
                    self.layout
                },
                header: self.header.close_menus(),
                ..self
            },
            Command::FocusSearch => Self {
                header: self.header.focus_search(),
                ..self
            },
            Command::DismissTransient => Self {
                layout: self.layout.with_sidebar(false),
                header: self.header.dismiss(),
                ..self
            },
        }
    }

    /// Whether the header has a search long enough to run.
    #[must_use]
    pub fn search_active(&self) -> bool {
        self.header.search_active()
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.notifications.unread_count()
    }
}
