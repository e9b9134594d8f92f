//! Sanitization options.

use serde::{Deserialize, Serialize};

/// Action types whose presence makes a hyperlink dangerous: each of them
/// can reach outside the document (navigation, launching, form posting).
pub(crate) const LINK_ACTION_NAMES: [&str; 6] =
    ["URI", "Launch", "GoToR", "GoToE", "SubmitForm", "ImportData"];

/// Which classes of active content to neutralize.
///
/// All three options default to on; a record with every option off turns
/// [`sanitize`](crate::sanitize) into a strict no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SanitizeOptions {
    /// Strip external-link annotations, neutralize navigation and
    /// submission actions, rewrite embedded URLs, remove UNC paths.
    pub remove_links: bool,
    /// Strip the AcroForm dictionary, XFA references, widget annotations,
    /// and XFA submit machinery.
    pub remove_forms: bool,
    /// Strip OpenAction scripting, the JavaScript name tree, and script
    /// literal bodies.
    pub remove_javascript: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self::all()
    }
}

impl SanitizeOptions {
    /// Every option enabled (the user-facing default).
    pub fn all() -> Self {
        Self {
            remove_links: true,
            remove_forms: true,
            remove_javascript: true,
        }
    }

    /// Every option disabled.
    pub fn none() -> Self {
        Self {
            remove_links: false,
            remove_forms: false,
            remove_javascript: false,
        }
    }

    /// True when no option is set and sanitization has nothing to do.
    pub fn is_noop(&self) -> bool {
        !(self.remove_links || self.remove_forms || self.remove_javascript)
    }

    /// Additional-actions (`/AA`) dictionaries go away when either links
    /// or scripting is being removed.
    pub fn strip_additional_actions(&self) -> bool {
        self.remove_links || self.remove_javascript
    }

    /// The action types to neutralize: the full navigation set when links
    /// are being removed, JavaScript alone when only scripting is.
    pub(crate) fn dangerous_action_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.remove_links {
            names.extend(LINK_ACTION_NAMES);
        }
        if self.remove_links || self.remove_javascript {
            names.push("JavaScript");
        }
        names
    }
}
