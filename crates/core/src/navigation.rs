//! Role-based navigation.
//!
//! The navigation tree is static. A role sees a top-level entry iff the role
//! is in the entry's role set; children follow their parent and are not
//! filtered again.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use serde::Serialize;

use crate::types::{Role, RoleSet};

/// Path used by entries that only group children.
pub const PLACEHOLDER_PATH: &str = "#";

/// Problems detected while building a [`NavigationTable`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("navigation entry '{0}' has no roles")]
    EmptyRoles(String),
    #[error("duplicate navigation entry id '{0}'")]
    DuplicateId(String),
    #[error("navigation entry '{id}' has invalid shortcut '{shortcut}'")]
    InvalidShortcut { id: String, shortcut: char },
}

/// One item of the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationEntry {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub path: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<char>,
    pub roles: RoleSet,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
}

impl NavigationEntry {
    /// Start an entry. Roles default to empty and must be set for top-level
    /// entries; children left empty inherit their parent's roles.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: String::new(),
            path: path.into(),
            description: String::new(),
            shortcut: None,
            roles: RoleSet::EMPTY,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub const fn shortcut(mut self, key: char) -> Self {
        self.shortcut = Some(key);
        self
    }

    #[must_use]
    pub const fn roles(mut self, roles: RoleSet) -> Self {
        self.roles = roles;
        self
    }

    #[must_use]
    pub fn child(mut self, mut child: Self) -> Self {
        if child.roles.is_empty() {
            child.roles = self.roles;
        }
        self.children.push(child);
        self
    }

    /// Whether this entry leads somewhere.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.path == PLACEHOLDER_PATH
    }

    #[must_use]
    pub const fn visible_to(&self, role: Role) -> bool {
        self.roles.contains(role)
    }

    fn walk<'a>(&'a self, out: &mut Vec<&'a Self>) {
        out.push(self);
        for child in &self.children {
            child.walk(out);
        }
    }
}

/// Validated, ordered navigation tree.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct NavigationTable {
    entries: Vec<NavigationEntry>,
}

static STANDARD: LazyLock<NavigationTable> = LazyLock::new(|| NavigationTable {
    entries: standard_entries(),
});

impl NavigationTable {
    /// Build a table, rejecting entries without roles, duplicate ids and
    /// shortcuts that are not a single ASCII letter or digit.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, in depth-first order.
    pub fn new(entries: Vec<NavigationEntry>) -> Result<Self, NavigationError> {
        let table = Self { entries };
        let mut seen = HashSet::new();

        for entry in table.iter() {
            if entry.roles.is_empty() {
                return Err(NavigationError::EmptyRoles(entry.id.clone()));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(NavigationError::DuplicateId(entry.id.clone()));
            }
            if let Some(shortcut) = entry.shortcut
                && !shortcut.is_ascii_alphanumeric()
            {
                return Err(NavigationError::InvalidShortcut {
                    id: entry.id.clone(),
                    shortcut,
                });
            }
        }

        Ok(table)
    }

    /// The console's sidebar.
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    #[must_use]
    pub fn entries(&self) -> &[NavigationEntry] {
        &self.entries
    }

    /// Every entry, depth first, in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &NavigationEntry> {
        let mut out = Vec::new();
        for entry in &self.entries {
            entry.walk(&mut out);
        }
        out.into_iter()
    }

    /// Top-level entries visible to `role`, in table order.
    #[must_use]
    pub fn visible_entries(&self, role: Role) -> Vec<&NavigationEntry> {
        visible_entries(&self.entries, role)
    }

    /// Shortcut key to destination path.
    ///
    /// Every entry is scanned regardless of role. Placeholder paths are
    /// skipped and a later entry overrides an earlier one with the same key.
    #[must_use]
    pub fn shortcuts(&self) -> BTreeMap<char, String> {
        let mut map = BTreeMap::new();
        for entry in self.iter() {
            if let Some(key) = entry.shortcut
                && !entry.is_placeholder()
            {
                map.insert(key.to_ascii_lowercase(), entry.path.clone());
            }
        }
        map
    }
}

/// Filter a slice of entries for a role, preserving order.
#[must_use]
pub fn visible_entries(entries: &[NavigationEntry], role: Role) -> Vec<&NavigationEntry> {
    entries.iter().filter(|entry| entry.visible_to(role)).collect()
}

/// Whether a sidebar entry should be highlighted for the current path.
///
/// The root only matches itself; every other path matches as a prefix.
#[must_use]
pub fn is_current_page(entry_path: &str, current: &str) -> bool {
    if entry_path == "/" {
        current == "/"
    } else {
        current.starts_with(entry_path)
    }
}

fn standard_entries() -> Vec<NavigationEntry> {
    use Role::{Admin, Auditor, Manager};

    let everyone = RoleSet::ALL;
    let staff = RoleSet::of(&[Admin, Manager, Auditor]);
    let managers = RoleSet::of(&[Admin, Manager]);
    let admins = RoleSet::of(&[Admin]);

    vec![
        NavigationEntry::new("appcenter", "AppCenter", "/")
            .icon("fas fa-th-large")
            .description("Main application dashboard")
            .shortcut('h')
            .roles(everyone),
        NavigationEntry::new("assessments", "Assessments", PLACEHOLDER_PATH)
            .icon("fas fa-clipboard-check")
            .description("Compliance framework assessments")
            .shortcut('a')
            .roles(staff)
            .child(
                NavigationEntry::new("eu_ai_act", "EU AI Act Assessment", "/assessments/ai-act")
                    .icon("fas fa-robot")
                    .description("EU AI Act compliance assessment"),
            )
            .child(
                NavigationEntry::new("gdpr_assessment", "GDPR Assessment", "/assessments/gdpr")
                    .icon("fas fa-user-shield")
                    .description("GDPR compliance assessment"),
            )
            .child(
                NavigationEntry::new("iso27001", "ISO 27001 Assessment", "/assessments/iso27001")
                    .icon("fas fa-certificate")
                    .description("ISO 27001 information security assessment"),
            ),
        NavigationEntry::new("dashboard", "Dashboard", "/dashboard")
            .icon("fas fa-tachometer-alt")
            .description("Executive compliance dashboard")
            .shortcut('d')
            .roles(managers),
        NavigationEntry::new("risk_management", "Risk Management", "/risk-management")
            .icon("fas fa-exclamation-triangle")
            .description("Risk identification and management")
            .shortcut('r')
            .roles(staff),
        NavigationEntry::new("controls", "Controls", "/controls")
            .icon("fas fa-shield-alt")
            .description("Security controls management")
            .shortcut('c')
            .roles(staff),
        NavigationEntry::new("policies", "Policies", "/policies")
            .icon("fas fa-file-contract")
            .description("Policy management and documentation")
            .shortcut('p')
            .roles(staff),
        NavigationEntry::new("workflows", "Workflows", "/workflows")
            .icon("fas fa-project-diagram")
            .description("Compliance workflows and automation")
            .shortcut('w')
            .roles(managers),
        NavigationEntry::new("reports", "Reports", "/reports")
            .icon("fas fa-chart-line")
            .description("Compliance reporting and analytics")
            .shortcut('t')
            .roles(staff),
        NavigationEntry::new("calendar", "Calendar", "/calendar")
            .icon("fas fa-calendar-alt")
            .description("Compliance calendar and deadlines")
            .shortcut('l')
            .roles(everyone),
        NavigationEntry::new("settings", "Settings", "/settings")
            .icon("fas fa-cog")
            .description("System configuration")
            .shortcut('s')
            .roles(admins),
    ]
}
