//! Offline inspection of navigation and layout decisions.
//!
//! Both commands run the same core logic the console uses, against an
//! in-memory session.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use arioncomply_core::session::SESSION_KEY;
use arioncomply_core::{
    AppShell, Email, EmailError, Identity, MemoryStore, NavigationEntry, NavigationTable, PageFrame,
    PageRequest, QueryFlags, Role, RoleParseError, SessionStore, SessionStoreError, UiState,
    UserId,
};

/// Errors from the inspection commands.
#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error(transparent)]
    Role(#[from] RoleParseError),

    #[error("invalid query parameter '{0}', expected key=value")]
    Query(String),

    #[error(transparent)]
    Email(#[from] EmailError),

    #[error(transparent)]
    Session(#[from] SessionStoreError),

    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Arguments of the `layout` command.
#[derive(Debug, Clone, Default)]
pub struct LayoutArgs {
    pub path: String,
    pub query: Vec<String>,
    pub anonymous: bool,
    pub embedded: bool,
    pub role: Option<String>,
}

/// Print the navigation tree visible to `role`.
///
/// # Errors
///
/// Returns an error for an unknown role.
pub fn nav(role: &str, json: bool) -> Result<(), InspectError> {
    let role: Role = role.parse()?;
    let output = if json {
        let entries = NavigationTable::standard().visible_entries(role);
        serde_json::to_string_pretty(&entries)?
    } else {
        render_nav(NavigationTable::standard(), role)
    };

    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
    Ok(())
}

/// Print the resolved layout for a path.
///
/// # Errors
///
/// Returns an error for a malformed query parameter or unknown role.
pub fn layout(args: &LayoutArgs) -> Result<(), InspectError> {
    let frame = resolve(args)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", render_frame(&frame));
    }
    Ok(())
}

/// Run the page pipeline for the command arguments.
fn resolve(args: &LayoutArgs) -> Result<PageFrame, InspectError> {
    let flags = parse_query(&args.query)?;

    let mut session = if args.anonymous {
        SessionStore::new(MemoryStore::with_entries([(SESSION_KEY, "inactive")]))
    } else {
        SessionStore::new(MemoryStore::new())
    };
    if let Some(role) = &args.role {
        let role: Role = role.parse()?;
        session.set(identity_for(role)?)?;
    }

    let request = PageRequest::new(args.path.clone())
        .with_flags(flags)
        .embedded(args.embedded);
    let (frame, _) = AppShell::default().run(&mut session, UiState::default(), &request);
    Ok(frame)
}

fn parse_query(pairs: &[String]) -> Result<QueryFlags, InspectError> {
    let parsed = pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .ok_or_else(|| InspectError::Query(pair.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(QueryFlags::from_pairs(parsed))
}

fn identity_for(role: Role) -> Result<Identity, EmailError> {
    Ok(Identity {
        id: UserId::new(format!("cli_{}", role.as_str())),
        name: format!("CLI {}", role.title()),
        email: Email::parse(&format!("{}@cli.arioncomply.local", role.as_str()))?,
        role,
        permissions: BTreeSet::new(),
        avatar: None,
    })
}

fn render_nav(table: &NavigationTable, role: Role) -> String {
    let mut out = format!("Navigation for {} ({})\n", role.title(), role.as_str());
    for entry in table.visible_entries(role) {
        render_entry(&mut out, entry, 0);
    }

    let shortcuts = table.shortcuts();
    if !shortcuts.is_empty() {
        out.push_str("\nShortcuts\n");
        for (key, path) in shortcuts {
            let _ = writeln!(out, "  Alt+{} -> {path}", key.to_ascii_uppercase());
        }
    }
    out.trim_end().to_string()
}

fn render_entry(out: &mut String, entry: &NavigationEntry, depth: usize) {
    let indent = "  ".repeat(depth + 1);
    let shortcut = entry
        .shortcut
        .map(|key| format!(" [Alt+{}]", key.to_ascii_uppercase()))
        .unwrap_or_default();
    let _ = writeln!(out, "{indent}{} {}{shortcut}", entry.name, entry.path);
    for child in &entry.children {
        render_entry(out, child, depth + 1);
    }
}

fn render_frame(frame: &PageFrame) -> String {
    let user = frame
        .identity
        .as_ref()
        .map_or_else(|| "anonymous".to_string(), |identity| {
            format!("{} ({})", identity.name, identity.role.as_str())
        });
    let mut out = String::new();
    let _ = writeln!(out, "path:         {}", frame.path);
    let _ = writeln!(out, "user:         {user}");
    let _ = writeln!(out, "layout:       {}", frame.variant());
    let _ = writeln!(out, "header:       {}", frame.chrome.has_header);
    let _ = writeln!(out, "sidebar:      {}", frame.chrome.has_sidebar);
    let _ = writeln!(out, "body class:   {}", frame.body_class);
    let _ = writeln!(out, "chat context: {}", frame.chat_context);
    if let Some(target) = frame.redirect {
        let _ = writeln!(out, "redirect:     {target}");
    }
    out.trim_end().to_string()
}
