//! Strategy orchestration.
//!
//! Tries the structural pass first, follows every successful save with a
//! byte-level URL sweep, and falls back to the full byte-level catalog on
//! parser failure. No path loses the original bytes.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{info, instrument, warn};

use crate::{
    cleaner::{ByteCleaner, StructureCleaner},
    config::SanitizeOptions,
    report::SanitizeReport,
};

/// The sanitized bytes together with the record of what was done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizeOutcome {
    pub bytes: Vec<u8>,
    pub report: SanitizeReport,
}

/// Sanitize a PDF held in memory.
///
/// Total: never panics, never performs I/O, and on total failure returns
/// the original bytes with an explanatory warning and no removal items.
/// Callers may invoke this concurrently from as many threads as they
/// like; there is no shared state.
#[instrument(skip(bytes, options), fields(len = bytes.len()))]
pub fn sanitize(bytes: &[u8], options: &SanitizeOptions) -> SanitizeOutcome {
    if options.is_noop() {
        return SanitizeOutcome {
            bytes: bytes.to_vec(),
            report: SanitizeReport::new(),
        };
    }

    match panic::catch_unwind(AssertUnwindSafe(|| sanitize_inner(bytes, options))) {
        Ok(outcome) => outcome,
        Err(cause) => {
            let cause = describe_panic(cause.as_ref());
            warn!(%cause, "sanitization panicked, returning original bytes");
            let mut report = SanitizeReport::new();
            report.set_warning(format!("Could not clean PDF: {cause}"));
            SanitizeOutcome {
                bytes: bytes.to_vec(),
                report,
            }
        }
    }
}

fn sanitize_inner(bytes: &[u8], options: &SanitizeOptions) -> SanitizeOutcome {
    let byte_cleaner = ByteCleaner::new();

    match StructureCleaner::new().sanitize(bytes, options) {
        Ok((mut saved, mut report)) => {
            // URLs inside stream payloads are invisible to the object
            // model; sweep the serialized bytes for them.
            let sweep = byte_cleaner.url_sweep(&mut saved, options);
            report.merge(sweep);
            info!(items = report.items.len(), "structural strategy succeeded");
            SanitizeOutcome {
                bytes: saved,
                report,
            }
        }
        Err(err) => {
            warn!(%err, "structural strategy failed, using byte-level pass");
            let mut working = bytes.to_vec();
            let mut report = byte_cleaner.sanitize(&mut working, options);
            report.set_warning(format!(
                "Structural sanitization failed ({err}); applied byte-level pass"
            ));
            SanitizeOutcome {
                bytes: working,
                report,
            }
        }
    }
}

fn describe_panic(cause: &(dyn Any + Send)) -> String {
    if let Some(message) = cause.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = cause.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
