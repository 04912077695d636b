//! Which surface of the application is visible.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveView {
    /// No manual loaded; waiting for an upload.
    #[default]
    Upload,
    /// Diagnostics chat over the loaded manual.
    Chat,
    /// Extracted maintenance task dashboard.
    Dashboard,
}

impl ActiveView {
    /// Views that require a loaded manual.
    pub fn requires_manual(&self) -> bool {
        !matches!(self, ActiveView::Upload)
    }
}
