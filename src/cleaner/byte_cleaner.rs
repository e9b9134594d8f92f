//! Byte-level sanitizer.
//!
//! Applies a fixed catalog of length-preserving rewrites against the raw
//! buffer. This is the primary path when the structural parser cannot
//! load the document, and it is re-run as a URL sweep after every
//! structural save: URLs inside content streams and XFA XML bodies are
//! invisible to the object model.
//!
//! Dictionary matching here is non-nested. A `<<…>>` match may end at an
//! inner `>>`, truncating the intended span. That is tolerated: the
//! mutation is still length-preserving, and blanking the anchoring key is
//! enough to neutralize the entry.

use std::ops::Range;

use regex::bytes::Regex;
use tracing::{debug, instrument, warn};

use crate::{
    cleaner::rewriter,
    config::SanitizeOptions,
    report::SanitizeReport,
    scanner::{contains_bytes, RegionClass, StreamRegionIndex},
};

/// Window inspected before a URL match for an XML namespace marker.
const XMLNS_WINDOW: usize = 30;

/// Same-length stand-in for a dangerous action type. `/Next` keeps the
/// action dictionary parseable; readers find no `/Next` chain entry and
/// ignore the action.
const NEUTRAL_ACTION: &[u8] = b"/S/Next";

/// Pattern-rule sanitizer over raw PDF bytes.
///
/// The output buffer always has the same length as the input, so every
/// offset in the cross-reference table stays valid.
pub struct ByteCleaner {
    open_action: Regex,
    additional_actions: Regex,
    names_javascript: Regex,
    xfa_reference: Regex,
    xfa_submit_url: Regex,
    xfa_submit_tag: Regex,
    xml_stylesheet: Regex,
    action_types: Vec<(&'static str, Regex)>,
    js_literal: Regex,
    unc_url: Regex,
    bare_url: Regex,
    acro_form: Regex,
}

impl ByteCleaner {
    pub fn new() -> Self {
        let action_types = crate::config::LINK_ACTION_NAMES
            .iter()
            .copied()
            .chain(["JavaScript"])
            .map(|name| {
                let pattern = format!(r"(?-u)/S\s*/{name}\b");
                (name, Regex::new(&pattern).expect("invalid action pattern"))
            })
            .collect();

        Self {
            open_action: Regex::new(r"(?s-u)/OpenAction\s*(?:<<.*?>>|\d+\s+\d+\s+R)")
                .expect("invalid OpenAction pattern"),
            additional_actions: Regex::new(r"(?s-u)/AA\s*<<.*?>>")
                .expect("invalid AA pattern"),
            names_javascript: Regex::new(r"(?s-u)/Names\s*<<.*?/JavaScript\s*<<.*?>>")
                .expect("invalid Names pattern"),
            xfa_reference: Regex::new(r"(?-u)/XFA\s+\d+\s+\d+\s+R")
                .expect("invalid XFA pattern"),
            xfa_submit_url: Regex::new(
                r#"(?s-u)<(?:xdp:)?submit\b[^>]*?(?:target|href)\s*=\s*(?:"([^"]*http[^"]*)"|'([^']*http[^']*)')"#,
            )
            .expect("invalid submit URL pattern"),
            xfa_submit_tag: Regex::new(r"(?s-u)</?(?:xdp:)?submit\b[^>]*>")
                .expect("invalid submit tag pattern"),
            xml_stylesheet: Regex::new(r"(?s-u)<\?xml-stylesheet.*?\?>")
                .expect("invalid stylesheet pattern"),
            action_types,
            js_literal: Regex::new(r"(?s-u)/JS\s*\((?:\\.|[^\\()])*\)")
                .expect("invalid JS literal pattern"),
            unc_url: Regex::new(r#"(?-u)\\+https?://[^\s"'>]+"#)
                .expect("invalid UNC pattern"),
            bare_url: Regex::new(r#"(?-u)https?://[^\s<>"'()\[\]]+"#)
                .expect("invalid URL pattern"),
            acro_form: Regex::new(r"(?s-u)/AcroForm\s*<<.*?>>")
                .expect("invalid AcroForm pattern"),
        }
    }

    /// Apply the full rule catalog in order. `buf.len()` never changes.
    #[instrument(skip(self, buf, options), fields(len = buf.len()))]
    pub fn sanitize(&self, buf: &mut [u8], options: &SanitizeOptions) -> SanitizeReport {
        let regions = StreamRegionIndex::scan(buf);
        let mut report = SanitizeReport::new();

        // URLs are tallied up front: rules below may blank a span that
        // carries one, and the sweep still owns reporting the removal.
        let urls_before = if options.remove_links {
            self.count_external_urls(buf, &regions)
        } else {
            0
        };

        let n = self.blank_matches(buf, &regions, &self.open_action);
        if n > 0 {
            report.push("Removed OpenAction");
        }

        if options.strip_additional_actions() {
            let n = self.blank_matches(buf, &regions, &self.additional_actions);
            if n > 0 {
                report.push("Removed additional actions");
            }
        }

        if options.remove_javascript {
            let n = self.substitute_matches(buf, &regions, &self.names_javascript, b"/Names<<>>");
            if n > 0 {
                report.push("Removed JavaScript name tree");
            }
        }

        if options.remove_forms {
            let n = self.blank_matches(buf, &regions, &self.xfa_reference);
            if n > 0 {
                report.push("Removed XFA form reference");
            }

            let n = self.rewrite_xfa_submit_urls(buf, &regions);
            report.push_count("Rewrote", "XFA submit URL", n);

            let n = self.blank_matches(buf, &regions, &self.xfa_submit_tag);
            report.push_count("Removed", "XFA submit tag", n);

            let n = self.blank_matches(buf, &regions, &self.xml_stylesheet);
            report.push_count("Removed", "XML stylesheet directive", n);
        }

        let active = options.dangerous_action_names();
        for (name, pattern) in &self.action_types {
            if !active.contains(name) {
                continue;
            }
            let n = self.neutralize_actions(buf, &regions, pattern);
            report.push_count("Neutralized", &format!("/{name} action"), n);
        }

        if options.remove_javascript {
            let n = self.substitute_matches(buf, &regions, &self.js_literal, b"/JS()");
            report.push_count("Emptied", "JavaScript literal", n);
        }

        self.sweep_urls(buf, &regions, options, urls_before, &mut report);

        if options.remove_forms {
            let n = self.blank_matches(buf, &regions, &self.acro_form);
            if n > 0 {
                report.push("Removed AcroForm dictionary");
            }
        }

        debug!(items = report.items.len(), "byte-level pass complete");
        report
    }

    /// The URL rules alone (UNC removal and bare URL rewrite), for the
    /// sweep that follows a successful structural save.
    pub fn url_sweep(&self, buf: &mut [u8], options: &SanitizeOptions) -> SanitizeReport {
        let regions = StreamRegionIndex::scan(buf);
        let mut report = SanitizeReport::new();
        let urls_before = if options.remove_links {
            self.count_external_urls(buf, &regions)
        } else {
            0
        };
        self.sweep_urls(buf, &regions, options, urls_before, &mut report);
        report
    }

    fn sweep_urls(
        &self,
        buf: &mut [u8],
        regions: &StreamRegionIndex,
        options: &SanitizeOptions,
        urls_before: usize,
        report: &mut SanitizeReport,
    ) {
        if !options.remove_links {
            return;
        }

        let n = self.blank_matches(buf, regions, &self.unc_url);
        report.push_count("Removed", "UNC-embedded URL", n);

        self.rewrite_bare_urls(buf, regions);
        let removed = urls_before.saturating_sub(self.count_external_urls(buf, regions));
        report.push_count("Removed", "external URL", removed);
    }

    fn collect_spans(
        &self,
        buf: &[u8],
        regions: &StreamRegionIndex,
        pattern: &Regex,
    ) -> Vec<Range<usize>> {
        pattern
            .find_iter(buf)
            .map(|found| found.range())
            .filter(|span| !regions.is_protected_span(span.start, span.end))
            .collect()
    }

    /// Blank every unprotected match; returns how many actually changed.
    fn blank_matches(&self, buf: &mut [u8], regions: &StreamRegionIndex, pattern: &Regex) -> usize {
        let mut changed = 0;
        for span in self.collect_spans(buf, regions, pattern) {
            if buf[span.clone()].iter().all(|&byte| byte == b' ') {
                continue;
            }
            match rewriter::blank(buf, span.clone()) {
                Ok(()) => changed += 1,
                Err(err) => warn!(%err, ?span, "blank rewrite rejected"),
            }
        }
        changed
    }

    fn substitute_matches(
        &self,
        buf: &mut [u8],
        regions: &StreamRegionIndex,
        pattern: &Regex,
        replacement: &[u8],
    ) -> usize {
        let mut changed = 0;
        for span in self.collect_spans(buf, regions, pattern) {
            let before = buf[span.clone()].to_vec();
            match rewriter::substitute(buf, span.clone(), replacement) {
                Ok(()) => {
                    if buf[span] != before[..] {
                        changed += 1;
                    }
                }
                Err(err) => warn!(%err, ?span, "substitution rejected"),
            }
        }
        changed
    }

    fn neutralize_actions(
        &self,
        buf: &mut [u8],
        regions: &StreamRegionIndex,
        pattern: &Regex,
    ) -> usize {
        let mut changed = 0;
        for span in self.collect_spans(buf, regions, pattern) {
            let before = buf[span.clone()].to_vec();
            // `/S/URI` with no whitespace is one byte too short for the
            // sentinel; an action without `/S` is just as inert.
            let result = if span.len() >= NEUTRAL_ACTION.len() {
                rewriter::substitute(buf, span.clone(), NEUTRAL_ACTION)
            } else {
                rewriter::blank(buf, span.clone())
            };
            match result {
                Ok(()) => {
                    if buf[span] != before[..] {
                        changed += 1;
                    }
                }
                Err(err) => warn!(%err, ?span, "action neutralization rejected"),
            }
        }
        changed
    }

    /// Rewrite submit-tag `target=`/`href=` URLs inside XML regions.
    fn rewrite_xfa_submit_urls(&self, buf: &mut [u8], regions: &StreamRegionIndex) -> usize {
        let mut spans = Vec::new();
        for region in regions
            .regions()
            .iter()
            .filter(|region| region.class == RegionClass::Xml)
        {
            let slice = &buf[region.start..region.end];
            for caps in self.xfa_submit_url.captures_iter(slice) {
                if let Some(url) = caps.get(1).or_else(|| caps.get(2)) {
                    spans.push(region.start + url.start()..region.start + url.end());
                }
            }
        }

        let mut changed = 0;
        for span in spans {
            let before = buf[span.clone()].to_vec();
            match rewriter::pad_url(buf, span.clone()) {
                Ok(()) => {
                    if buf[span] != before[..] {
                        changed += 1;
                    }
                }
                Err(err) => warn!(%err, ?span, "submit URL rewrite rejected"),
            }
        }
        changed
    }

    fn rewrite_bare_urls(&self, buf: &mut [u8], regions: &StreamRegionIndex) -> usize {
        let spans: Vec<Range<usize>> = self
            .bare_url
            .find_iter(buf)
            .map(|found| found.range())
            .filter(|span| !regions.is_protected_span(span.start, span.end))
            .filter(|span| !is_namespace_url(buf, span.start))
            .collect();

        let mut changed = 0;
        for span in spans {
            let before = buf[span.clone()].to_vec();
            match rewriter::pad_url(buf, span.clone()) {
                Ok(()) => {
                    if buf[span] != before[..] {
                        changed += 1;
                    }
                }
                Err(err) => warn!(%err, ?span, "URL rewrite rejected"),
            }
        }
        changed
    }

    /// Rewritable external URLs currently present in the buffer.
    fn count_external_urls(&self, buf: &[u8], regions: &StreamRegionIndex) -> usize {
        self.bare_url
            .find_iter(buf)
            .map(|found| found.range())
            .filter(|span| !regions.is_protected_span(span.start, span.end))
            .filter(|span| !is_namespace_url(buf, span.start))
            .count()
    }
}

impl Default for ByteCleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// URLs directly preceded by an `xmlns` marker are namespace identifiers,
/// not dereferenceable links, and must survive byte-identically.
fn is_namespace_url(buf: &[u8], start: usize) -> bool {
    let window = &buf[start.saturating_sub(XMLNS_WINDOW)..start];
    contains_bytes(window, b"xmlns=") || contains_bytes(window, b"xmlns:")
}
