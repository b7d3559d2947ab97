//! Notification list.
//!
//! The unread count is computed from the list, so marking an already-read
//! item, or removing one, can never skew it.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::NotificationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Newest first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationState {
    items: Vec<Notification>,
}

impl NotificationState {
    /// The three notifications shown to a fresh visitor.
    #[must_use]
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let demo = |id: &str, title: &str, message: &str, kind, age: Duration, read, icon: &str| {
            Notification {
                id: NotificationId::new(id),
                title: title.to_owned(),
                message: message.to_owned(),
                kind,
                timestamp: now - age,
                read,
                icon: Some(icon.to_owned()),
            }
        };

        Self {
            items: vec![
                demo(
                    "1",
                    "High Risk Detected",
                    "AI system requires immediate review",
                    NotificationKind::Warning,
                    Duration::hours(2),
                    false,
                    "fas fa-exclamation-triangle",
                ),
                demo(
                    "2",
                    "Assessment Complete",
                    "GDPR assessment has been completed",
                    NotificationKind::Success,
                    Duration::hours(4),
                    false,
                    "fas fa-check-circle",
                ),
                demo(
                    "3",
                    "System Update",
                    "New features available in AI Act module",
                    NotificationKind::Info,
                    Duration::days(1),
                    true,
                    "fas fa-info-circle",
                ),
            ],
        }
    }

    #[must_use]
    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    /// Insert a new unread notification at the front.
    #[must_use]
    pub fn add(
        mut self,
        title: String,
        message: String,
        kind: NotificationKind,
        icon: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        self.items.insert(
            0,
            Notification {
                id: NotificationId::generate(),
                title,
                message,
                kind,
                timestamp: now,
                read: false,
                icon,
            },
        );
        self
    }

    #[must_use]
    pub fn mark_read(mut self, id: &NotificationId) -> Self {
        if let Some(item) = self.items.iter_mut().find(|n| &n.id == id) {
            item.read = true;
        }
        self
    }

    #[must_use]
    pub fn mark_all_read(mut self) -> Self {
        for item in &mut self.items {
            item.read = true;
        }
        self
    }

    #[must_use]
    pub fn remove(mut self, id: &NotificationId) -> Self {
        self.items.retain(|n| &n.id != id);
        self
    }

    #[must_use]
    pub fn cleared(self) -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> NotificationState {
        NotificationState::seeded(Utc::now())
    }

    #[test]
    fn test_seeded_has_two_unread() {
        let state = seeded();
        assert_eq!(state.items().len(), 3);
        assert_eq!(state.unread_count(), 2);
    }

    #[test]
    fn test_marking_read_twice_counts_once() {
        let id = NotificationId::new("1");
        let state = seeded().mark_read(&id).mark_read(&id);
        assert_eq!(state.unread_count(), 1);
    }

    #[test]
    fn test_marking_already_read_changes_nothing() {
        let state = seeded().mark_read(&NotificationId::new("3"));
        assert_eq!(state.unread_count(), 2);
    }

    #[test]
    fn test_unread_never_negative() {
        let state = seeded()
            .mark_all_read()
            .mark_read(&NotificationId::new("1"))
            .remove(&NotificationId::new("2"));
        assert_eq!(state.unread_count(), 0);
    }

    #[test]
    fn test_add_puts_newest_first() {
        let state = seeded().add(
            "Policy Due".to_owned(),
            "Review access policy".to_owned(),
            NotificationKind::Info,
            None,
            Utc::now(),
        );
        assert_eq!(state.items()[0].title, "Policy Due");
        assert_eq!(state.unread_count(), 3);
    }

    #[test]
    fn test_remove_unread_decrements() {
        let state = seeded().remove(&NotificationId::new("1"));
        assert_eq!(state.unread_count(), 1);
        assert_eq!(state.items().len(), 2);
    }

    #[test]
    fn test_cleared() {
        let state = seeded().cleared();
        assert!(state.items().is_empty());
        assert_eq!(state.unread_count(), 0);
    }
}
