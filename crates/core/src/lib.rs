//! ArionComply Core - console decision logic.
//!
//! This crate holds everything the console decides without touching the
//! network or a database. It is shared by:
//! - `console` - the axum service that renders pages and proxies chat
//! - `cli` - migrations and offline inspection of layouts and navigation
//!
//! # Architecture
//!
//! State is passed explicitly. Session persistence goes through the
//! [`session::KeyValueStore`] trait, and UI changes go through the
//! [`ui::UiState`] reducer, so the HTTP layer only has to load values, run
//! the [`pipeline`], and store the results.
//!
//! # Modules
//!
//! - [`types`] - Identity, roles, emails and newtype ids
//! - [`layout`] - Layout variant resolution and per-path tables
//! - [`navigation`] - Role-filtered sidebar tree and shortcut scan
//! - [`input`] - Keyboard command dispatch
//! - [`session`] - Identity persisted in a key-value store
//! - [`ui`] - Sidebar, header, chat and notification state
//! - [`pipeline`] - restore, resolve, contextualise, navigate

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod input;
pub mod layout;
pub mod navigation;
pub mod pipeline;
pub mod session;
pub mod types;
pub mod ui;

pub use input::{Command, InputDispatcher, KeyEvent, ShortcutTable};
pub use layout::{Chrome, LayoutTable, LayoutVariant, QueryFlags, resolve_layout};
pub use navigation::{NavigationEntry, NavigationError, NavigationTable, visible_entries};
pub use pipeline::{AppShell, NavItem, PageFrame, PageRequest};
pub use session::{KeyValueStore, MemoryStore, RestoreOutcome, SessionStore, SessionStoreError};
pub use types::*;
pub use ui::{UiAction, UiState};
