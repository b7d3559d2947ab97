//! Keyboard input dispatch.
//!
//! All keyboard commands go through [`InputDispatcher::dispatch`], which
//! consults a single [`ShortcutTable`] built from the navigation tree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::navigation::NavigationTable;

/// A key press with its modifier state.
///
/// `key` follows the DOM `KeyboardEvent.key` convention (`"k"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    pub key: String,
    #[serde(default)]
    pub alt_key: bool,
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub meta_key: bool,
    #[serde(default)]
    pub shift_key: bool,
}

impl KeyEvent {
    pub fn plain(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn alt(key: impl Into<String>) -> Self {
        Self {
            alt_key: true,
            ..Self::plain(key)
        }
    }

    pub fn ctrl(key: impl Into<String>) -> Self {
        Self {
            ctrl_key: true,
            ..Self::plain(key)
        }
    }

    pub fn meta(key: impl Into<String>) -> Self {
        Self {
            meta_key: true,
            ..Self::plain(key)
        }
    }

    fn single_char(&self) -> Option<char> {
        let mut chars = self.key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c.to_ascii_lowercase()),
            _ => None,
        }
    }
}

/// What a key press asks the UI to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Navigate { path: String },
    FocusSearch,
    /// Clear search text, close the header menus and the sidebar.
    DismissTransient,
}

/// Alt+key navigation shortcuts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ShortcutTable(BTreeMap<char, String>);

impl ShortcutTable {
    #[must_use]
    pub fn from_navigation(table: &NavigationTable) -> Self {
        Self(table.shortcuts())
    }

    #[must_use]
    pub fn get(&self, key: char) -> Option<&str> {
        self.0.get(&key.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &str)> {
        self.0.iter().map(|(key, path)| (*key, path.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Maps key events to commands.
#[derive(Debug, Clone, Default)]
pub struct InputDispatcher {
    shortcuts: ShortcutTable,
}

impl InputDispatcher {
    #[must_use]
    pub const fn new(shortcuts: ShortcutTable) -> Self {
        Self { shortcuts }
    }

    #[must_use]
    pub fn standard() -> Self {
        Self::new(ShortcutTable::from_navigation(NavigationTable::standard()))
    }

    #[must_use]
    pub const fn shortcuts(&self) -> &ShortcutTable {
        &self.shortcuts
    }

    /// Translate one key event. Unmapped keys yield `None`.
    #[must_use]
    pub fn dispatch(&self, event: &KeyEvent) -> Option<Command> {
        if event.key == "Escape" {
            return Some(Command::DismissTransient);
        }

        let key = event.single_char()?;

        if (event.ctrl_key || event.meta_key) && key == 'k' {
            return Some(Command::FocusSearch);
        }

        if event.alt_key && !event.ctrl_key && !event.meta_key {
            return self.shortcuts.get(key).map(|path| Command::Navigate {
                path: path.to_owned(),
            });
        }

        None
    }
}
