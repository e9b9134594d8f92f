//! PDF sanitization engine.
//!
//! Neutralizes active content that can be abused for phishing,
//! exfiltration, or code execution: external hyperlinks, form widgets
//! (including XFA), embedded scripting, automatic actions, and URLs
//! carried in embedded XML payloads. The output stays a valid PDF
//! viewable in any conforming reader.
//!
//! Two complementary strategies do the work. The structural pass edits
//! the parsed object graph: catalog keys, page annotations, form trees.
//! The byte-level pass applies length-preserving rewrites to the raw
//! buffer, which keeps every cross-reference offset valid; it is the
//! fallback for documents the parser cannot load, and it re-runs as a
//! URL sweep after every structural save because URLs inside content
//! streams and XFA bodies are invisible to the object model.
//!
//! ```
//! use pdf_sanitizer::{sanitize, SanitizeOptions};
//!
//! let outcome = sanitize(b"no active content here", &SanitizeOptions::default());
//! assert_eq!(outcome.bytes, b"no active content here");
//! assert!(outcome.report.items.is_empty());
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod report;
pub mod sanitizer;
pub mod scanner;

// Re-exports for crate consumers
pub use cleaner::{ByteCleaner, StructureCleaner};
pub use config::SanitizeOptions;
pub use error::{Error, Result};
pub use report::SanitizeReport;
pub use sanitizer::{sanitize, SanitizeOutcome};
pub use scanner::{RegionClass, StreamRegion, StreamRegionIndex};
