//! Layout resolution.
//!
//! Every navigation picks exactly one [`LayoutVariant`], i.e. which chrome
//! (sidebar, header, nothing) wraps the page. Resolution order, first match
//! wins:
//!
//! 1. query override (`embed=1`, `standalone=1`, `header-only=1`)
//! 2. the page is rendered inside another document
//! 3. the visitor is not authenticated
//! 4. the per-path default table, falling back to [`LayoutVariant::FullApp`]

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Where unauthenticated visitors of protected pages are sent.
pub const LOGIN_PATH: &str = "/auth";

/// Chat context label used when a path has no specific one.
pub const DEFAULT_CHAT_CONTEXT: &str = "General Assistance";

/// Structural chrome wrapping page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutVariant {
    /// Sidebar, header and content.
    #[default]
    FullApp,
    /// Header and content.
    HeaderOnly,
    /// Content only.
    Standalone,
    /// Content only, inside a host document.
    Embedded,
}

impl LayoutVariant {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FullApp => "full-app",
            Self::HeaderOnly => "header-only",
            Self::Standalone => "standalone",
            Self::Embedded => "embedded",
        }
    }

    #[must_use]
    pub const fn chrome(self) -> Chrome {
        Chrome {
            variant: self,
            has_header: matches!(self, Self::FullApp | Self::HeaderOnly),
            has_sidebar: matches!(self, Self::FullApp),
            is_embedded: matches!(self, Self::Embedded),
            is_standalone: matches!(self, Self::Standalone),
        }
    }

    /// CSS classes applied to `<body>` for this variant.
    #[must_use]
    pub fn body_classes(self) -> String {
        match self {
            Self::Embedded => format!("layout-{} embedded-mode", self.as_str()),
            _ => format!("layout-{}", self.as_str()),
        }
    }
}

impl std::fmt::Display for LayoutVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the chrome components need to know about a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chrome {
    pub variant: LayoutVariant,
    pub has_header: bool,
    pub has_sidebar: bool,
    pub is_embedded: bool,
    pub is_standalone: bool,
}

/// Layout override flags read from the query string.
///
/// Only the exact value `1` switches a flag on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryFlags {
    pub embed: bool,
    pub standalone: bool,
    pub header_only: bool,
}

impl QueryFlags {
    /// Collect flags from decoded query pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        pairs
            .into_iter()
            .fold(Self::default(), |mut flags, (key, value)| {
                let on = value == "1";
                match key {
                    "embed" => flags.embed |= on,
                    "standalone" => flags.standalone |= on,
                    "header-only" => flags.header_only |= on,
                    _ => {}
                }
                flags
            })
    }

    /// Parse a raw query string such as `embed=1&x=y`, percent-decoding
    /// each pair first.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let pairs: Vec<_> = url::form_urlencoded::parse(query.as_bytes()).collect();
        Self::from_pairs(pairs.iter().map(|(key, value)| (key.as_ref(), value.as_ref())))
    }

    const fn forced(self) -> Option<LayoutVariant> {
        if self.embed {
            Some(LayoutVariant::Embedded)
        } else if self.standalone {
            Some(LayoutVariant::Standalone)
        } else if self.header_only {
            Some(LayoutVariant::HeaderOnly)
        } else {
            None
        }
    }
}

/// Inputs to a single layout decision.
#[derive(Debug, Clone, Copy)]
pub struct LayoutRequest<'a> {
    pub path: &'a str,
    pub flags: QueryFlags,
    pub embedded_frame: bool,
    pub authenticated: bool,
}

/// Static per-path tables consulted during resolution.
#[derive(Debug, Clone)]
pub struct LayoutTable {
    defaults: HashMap<String, LayoutVariant>,
    public_paths: Vec<String>,
    chat_contexts: HashMap<String, String>,
}

static STANDARD: LazyLock<LayoutTable> = LazyLock::new(LayoutTable::build_standard);

impl LayoutTable {
    /// Create a table from explicit mappings.
    pub fn new<D, P, C>(defaults: D, public_paths: P, chat_contexts: C) -> Self
    where
        D: IntoIterator<Item = (String, LayoutVariant)>,
        P: IntoIterator<Item = String>,
        C: IntoIterator<Item = (String, String)>,
    {
        Self {
            defaults: defaults.into_iter().collect(),
            public_paths: public_paths.into_iter().collect(),
            chat_contexts: chat_contexts.into_iter().collect(),
        }
    }

    /// The console's built-in tables.
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    fn build_standard() -> Self {
        use LayoutVariant::{FullApp, HeaderOnly, Standalone};

        let defaults = [
            ("/", FullApp),
            ("/dashboard", FullApp),
            ("/risk-management", FullApp),
            ("/controls", FullApp),
            ("/policies", FullApp),
            ("/workflows", FullApp),
            ("/reports", FullApp),
            ("/calendar", FullApp),
            ("/settings", FullApp),
            ("/assessments", FullApp),
            ("/assessments/ai-act", FullApp),
            ("/assessments/gdpr", FullApp),
            ("/assessments/iso27001", FullApp),
            ("/chat", FullApp),
            ("/help", HeaderOnly),
            ("/privacy", HeaderOnly),
            ("/terms", HeaderOnly),
            ("/auth", Standalone),
            ("/login", Standalone),
            ("/register", Standalone),
            ("/forgot-password", Standalone),
        ];

        let chat_contexts = [
            ("/", "Application Center"),
            ("/dashboard", "Dashboard Overview"),
            ("/risk-management", "Risk Management"),
            ("/controls", "Security Controls"),
            ("/policies", "Policy Management"),
            ("/workflows", "Compliance Workflows"),
            ("/reports", "Reporting & Analytics"),
            ("/assessments", "Compliance Assessments"),
            ("/assessments/ai-act", "EU AI Act Assessment"),
            ("/assessments/gdpr", "GDPR Assessment"),
            ("/assessments/iso27001", "ISO 27001 Assessment"),
        ];

        Self::new(
            defaults.map(|(path, variant)| (path.to_owned(), variant)),
            ["/help", "/privacy", "/terms"].map(str::to_owned),
            chat_contexts.map(|(path, label)| (path.to_owned(), label.to_owned())),
        )
    }

    /// Resolve the layout variant for one navigation. Never fails.
    #[must_use]
    pub fn resolve(&self, request: &LayoutRequest<'_>) -> LayoutVariant {
        if let Some(forced) = request.flags.forced() {
            return forced;
        }
        if request.embedded_frame {
            return LayoutVariant::Embedded;
        }
        if !request.authenticated {
            // Public and protected pages alike render bare; the redirect for
            // protected pages is the caller's job (see `login_redirect`).
            return LayoutVariant::Standalone;
        }
        self.default_for(request.path)
    }

    /// Configured default for a path, [`LayoutVariant::FullApp`] if none.
    #[must_use]
    pub fn default_for(&self, path: &str) -> LayoutVariant {
        self.defaults.get(path).copied().unwrap_or_default()
    }

    /// Whether a path can be viewed without logging in.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.public_paths.iter().any(|p| p == path)
    }

    /// Where an unauthenticated visitor must be sent, if anywhere.
    ///
    /// Public pages and pages whose own default is standalone (login,
    /// register, ...) never redirect.
    #[must_use]
    pub fn login_redirect(&self, path: &str, authenticated: bool) -> Option<&'static str> {
        let exempt = self.is_public(path)
            || self.defaults.get(path) == Some(&LayoutVariant::Standalone);
        (!authenticated && !exempt).then_some(LOGIN_PATH)
    }

    /// Chat assistant context label for a path.
    #[must_use]
    pub fn chat_context(&self, path: &str) -> &str {
        self.chat_contexts
            .get(path)
            .map_or(DEFAULT_CHAT_CONTEXT, String::as_str)
    }
}

/// Resolve against the built-in tables.
#[must_use]
pub fn resolve_layout(
    path: &str,
    flags: QueryFlags,
    embedded_frame: bool,
    authenticated: bool,
) -> LayoutVariant {
    LayoutTable::standard().resolve(&LayoutRequest {
        path,
        flags,
        embedded_frame,
        authenticated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PATHS: &[&str] = &[
        "/",
        "/dashboard",
        "/help",
        "/login",
        "/chat",
        "/nowhere",
        "",
        "/assessments/gdpr",
    ];

    fn every_flag_combination() -> Vec<QueryFlags> {
        let mut out = Vec::new();
        for bits in 0u8..8 {
            out.push(QueryFlags {
                embed: bits & 1 != 0,
                standalone: bits & 2 != 0,
                header_only: bits & 4 != 0,
            });
        }
        out
    }

    #[test]
    fn test_resolution_is_total() {
        for path in ALL_PATHS {
            for flags in every_flag_combination() {
                for embedded in [false, true] {
                    for authenticated in [false, true] {
                        // Must return without panicking; the value itself is
                        // checked by the precedence tests below.
                        let _ = resolve_layout(path, flags, embedded, authenticated);
                    }
                }
            }
        }
    }

    #[test]
    fn test_query_override_beats_default() {
        let flags = QueryFlags::from_query("embed=1");
        assert_eq!(
            resolve_layout("/dashboard", flags, false, true),
            LayoutVariant::Embedded
        );
    }

    #[test]
    fn test_query_override_order() {
        let all = QueryFlags::from_query("header-only=1&standalone=1&embed=1");
        assert_eq!(resolve_layout("/", all, false, true), LayoutVariant::Embedded);

        let two = QueryFlags::from_query("header-only=1&standalone=1");
        assert_eq!(resolve_layout("/", two, false, true), LayoutVariant::Standalone);

        let one = QueryFlags::from_query("header-only=1");
        assert_eq!(resolve_layout("/", one, true, false), LayoutVariant::HeaderOnly);
    }

    #[test]
    fn test_query_pairs_are_decoded() {
        let flags = QueryFlags::from_query("header%2Donly=%31&embed%3D1");
        assert!(flags.header_only);
        assert!(!flags.embed);

        let spaced = QueryFlags::from_query("standalone=1+");
        assert!(!spaced.standalone);
    }

    #[test]
    fn test_only_exact_one_counts() {
        let flags = QueryFlags::from_query("embed=true&standalone=0&header-only=");
        assert_eq!(flags, QueryFlags::default());
    }

    #[test]
    fn test_frame_beats_authentication_and_default() {
        assert_eq!(
            resolve_layout("/help", QueryFlags::default(), true, true),
            LayoutVariant::Embedded
        );
        assert_eq!(
            resolve_layout("/dashboard", QueryFlags::default(), true, false),
            LayoutVariant::Embedded
        );
    }

    #[test]
    fn test_unauthenticated_is_standalone() {
        assert_eq!(
            resolve_layout("/dashboard", QueryFlags::default(), false, false),
            LayoutVariant::Standalone
        );
        assert_eq!(
            resolve_layout("/help", QueryFlags::default(), false, false),
            LayoutVariant::Standalone
        );
    }

    #[test]
    fn test_defaults_and_fallback() {
        let none = QueryFlags::default();
        assert_eq!(resolve_layout("/help", none, false, true), LayoutVariant::HeaderOnly);
        assert_eq!(resolve_layout("/login", none, false, true), LayoutVariant::Standalone);
        assert_eq!(resolve_layout("/dashboard", none, false, true), LayoutVariant::FullApp);
        assert_eq!(resolve_layout("/unknown/page", none, false, true), LayoutVariant::FullApp);
    }

    #[test]
    fn test_login_redirect() {
        let table = LayoutTable::standard();
        assert_eq!(table.login_redirect("/dashboard", false), Some(LOGIN_PATH));
        assert_eq!(table.login_redirect("/unknown", false), Some(LOGIN_PATH));
        assert_eq!(table.login_redirect("/help", false), None);
        assert_eq!(table.login_redirect("/login", false), None);
        assert_eq!(table.login_redirect("/forgot-password", false), None);
        assert_eq!(table.login_redirect(LOGIN_PATH, false), None);
        assert_eq!(table.login_redirect("/dashboard", true), None);
    }

    #[test]
    fn test_chat_context() {
        let table = LayoutTable::standard();
        assert_eq!(table.chat_context("/dashboard"), "Dashboard Overview");
        assert_eq!(table.chat_context("/assessments/gdpr"), "GDPR Assessment");
        assert_eq!(table.chat_context("/help"), DEFAULT_CHAT_CONTEXT);
    }

    #[test]
    fn test_chrome() {
        let full = LayoutVariant::FullApp.chrome();
        assert!(full.has_header && full.has_sidebar);

        let header = LayoutVariant::HeaderOnly.chrome();
        assert!(header.has_header && !header.has_sidebar);

        let standalone = LayoutVariant::Standalone.chrome();
        assert!(!standalone.has_header && standalone.is_standalone);

        let embedded = LayoutVariant::Embedded.chrome();
        assert!(!embedded.has_header && !embedded.has_sidebar && embedded.is_embedded);
    }

    #[test]
    fn test_body_classes() {
        assert_eq!(LayoutVariant::FullApp.body_classes(), "layout-full-app");
        assert_eq!(
            LayoutVariant::Embedded.body_classes(),
            "layout-embedded embedded-mode"
        );
    }

    #[test]
    fn test_variant_wire_names() {
        let json = serde_json::to_string(&LayoutVariant::HeaderOnly).expect("serialize");
        assert_eq!(json, "\"header-only\"");
    }
}
