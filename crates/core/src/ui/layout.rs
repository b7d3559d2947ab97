//! Sidebar and viewport state.

use serde::{Deserialize, Serialize};

use crate::layout::LayoutVariant;

/// Viewports at or below this width count as mobile.
pub const MOBILE_BREAKPOINT: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutState {
    pub sidebar_open: bool,
    pub variant: LayoutVariant,
    pub is_mobile: bool,
}

impl LayoutState {
    #[must_use]
    pub const fn toggle_sidebar(self) -> Self {
        Self {
            sidebar_open: !self.sidebar_open,
            ..self
        }
    }

    #[must_use]
    pub const fn with_sidebar(self, open: bool) -> Self {
        Self {
            sidebar_open: open,
            ..self
        }
    }

    #[must_use]
    pub const fn with_variant(self, variant: LayoutVariant) -> Self {
        Self { variant, ..self }
    }

    /// Switching to mobile closes the sidebar.
    #[must_use]
    pub const fn with_mobile(self, mobile: bool) -> Self {
        Self {
            is_mobile: mobile,
            sidebar_open: self.sidebar_open && !mobile,
            ..self
        }
    }

    #[must_use]
    pub const fn with_viewport_width(self, width: u32) -> Self {
        self.with_mobile(width <= MOBILE_BREAKPOINT)
    }
}
