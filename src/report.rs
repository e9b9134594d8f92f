//! Caller-facing sanitization report.

use serde::{Deserialize, Serialize};

/// Ordered record of what sanitization removed or neutralized.
///
/// Items are short human-readable descriptors in order of application
/// ("Removed OpenAction", "Removed 7 external URLs"). An empty item list
/// means the document was clean. The warning is present exactly when a
/// strategy degraded: parser fallback or total failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizeReport {
    pub items: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl SanitizeReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a singleton descriptor.
    pub fn push(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }

    /// Append an aggregate descriptor ("Removed 7 external URLs").
    ///
    /// Nothing is recorded for a zero count: every report entry must
    /// correspond to at least one performed mutation.
    pub fn push_count(&mut self, action: &str, noun: &str, count: usize) {
        match count {
            0 => {}
            1 => self.items.push(format!("{action} {noun}")),
            n => self.items.push(format!("{action} {n} {noun}s")),
        }
    }

    /// Append another report's items, preserving application order.
    /// The first warning wins.
    pub fn merge(&mut self, other: SanitizeReport) {
        self.items.extend(other.items);
        if self.warning.is_none() {
            self.warning = other.warning;
        }
    }

    pub fn set_warning(&mut self, warning: impl Into<String>) {
        self.warning = Some(warning.into());
    }

    /// True when nothing was removed and nothing degraded.
    pub fn is_clean(&self) -> bool {
        self.items.is_empty() && self.warning.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_entries_pluralize() {
        let mut report = SanitizeReport::new();
        report.push_count("Removed", "external URL", 0);
        report.push_count("Removed", "external URL", 1);
        report.push_count("Removed", "external URL", 7);
        assert_eq!(
            report.items,
            vec!["Removed external URL", "Removed 7 external URLs"]
        );
    }

    #[test]
    fn merge_keeps_first_warning() {
        let mut first = SanitizeReport::new();
        first.push("Removed OpenAction");
        first.set_warning("parser fallback");

        let mut second = SanitizeReport::new();
        second.push("Removed AcroForm dictionary");
        second.set_warning("should be ignored");

        first.merge(second);
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.warning.as_deref(), Some("parser fallback"));
        assert!(!first.is_clean());
    }
}
