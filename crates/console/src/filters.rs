//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Keyboard hint for a navigation shortcut key.
///
/// Usage in templates: `{{ key|shortcut_label }}` renders `Alt+D`.
#[askama::filter_fn]
pub fn shortcut_label(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(label_for(&value.to_string()))
}

fn label_for(key: &str) -> String {
    format!("Alt+{}", key.trim().to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcut_label() {
        assert_eq!(label_for("d"), "Alt+D");
        assert_eq!(label_for("S"), "Alt+S");
    }
}
