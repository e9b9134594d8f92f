//! Stream region index over a raw PDF buffer.
//!
//! One pass locates every `stream … endstream` span and classifies it, so
//! the byte-level rewriter knows which offsets are safe to touch. Binary
//! regions are opaque: no rewrite may land inside one. XML and metadata
//! regions carry text and are in-scope rewrite targets.

use tracing::debug;

use super::{contains_bytes, find_bytes};

const KEYWORD_STREAM: &[u8] = b"stream";
const KEYWORD_ENDSTREAM: &[u8] = b"endstream";

/// Dictionary window inspected before the `stream` keyword.
const DICT_WINDOW: usize = 500;
/// Content prefix inspected for XML markers.
const CONTENT_WINDOW: usize = 500;

/// What a stream region carries, and therefore whether it may be rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionClass {
    /// Opaque payload (images, compressed content). Never rewritten.
    Binary,
    /// Embedded XML (XFA, XDP, XMP). Text, rewritable.
    Xml,
    /// Metadata stream that did not look like XML. Text, rewritable.
    Metadata,
}

/// Half-open byte range `[start, end)` of one stream body: `start` is the
/// first content byte after `stream\n` (or `stream\r\n`), `end` the index
/// of the matching `endstream` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRegion {
    pub start: usize,
    pub end: usize,
    pub class: RegionClass,
}

impl StreamRegion {
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// Ordered, non-overlapping index of every stream region in a buffer.
#[derive(Debug, Default)]
pub struct StreamRegionIndex {
    regions: Vec<StreamRegion>,
}

impl StreamRegionIndex {
    /// Scan the buffer once.
    ///
    /// `stream` keyword hits that are the tail of `endstream` are skipped,
    /// as are keywords not followed by a stream EOL. An unterminated
    /// stream (no matching `endstream`) produces no region; the scanner
    /// moves on.
    pub fn scan(buf: &[u8]) -> Self {
        let mut regions = Vec::new();
        let mut cursor = 0;

        while let Some(found) = find_bytes(&buf[cursor..], KEYWORD_STREAM) {
            let keyword = cursor + found;
            let after = keyword + KEYWORD_STREAM.len();

            if keyword >= 3 && &buf[keyword - 3..keyword] == b"end" {
                cursor = after;
                continue;
            }

            let start = match (buf.get(after), buf.get(after + 1)) {
                (Some(b'\n'), _) => after + 1,
                (Some(b'\r'), Some(b'\n')) => after + 2,
                _ => {
                    cursor = after;
                    continue;
                }
            };

            let Some(found_end) = find_bytes(&buf[start..], KEYWORD_ENDSTREAM) else {
                debug!(offset = keyword, "unterminated stream, no region recorded");
                cursor = after;
                continue;
            };
            let end = start + found_end;

            regions.push(StreamRegion {
                start,
                end,
                class: classify(buf, keyword, start, end),
            });
            cursor = end + KEYWORD_ENDSTREAM.len();
        }

        Self { regions }
    }

    pub fn regions(&self) -> &[StreamRegion] {
        &self.regions
    }

    /// True iff the offset lies inside a binary region.
    pub fn is_protected(&self, offset: usize) -> bool {
        matches!(
            self.region_at(offset),
            Some(region) if region.class == RegionClass::Binary
        )
    }

    /// True iff any byte of `[start, end)` lies inside a binary region.
    pub fn is_protected_span(&self, start: usize, end: usize) -> bool {
        self.regions
            .iter()
            .any(|region| region.class == RegionClass::Binary && region.start < end && start < region.end)
    }

    fn region_at(&self, offset: usize) -> Option<&StreamRegion> {
        // Regions are ordered and disjoint.
        let index = self.regions.partition_point(|region| region.end <= offset);
        self.regions.get(index).filter(|region| region.contains(offset))
    }
}

fn classify(buf: &[u8], keyword: usize, start: usize, end: usize) -> RegionClass {
    let dict_window = &buf[keyword.saturating_sub(DICT_WINDOW)..keyword];
    if contains_bytes(dict_window, b"/Subtype /XML")
        || contains_bytes(dict_window, b"/XFA")
        || contains_bytes(dict_window, b"/AcroForm")
    {
        return RegionClass::Xml;
    }

    let content = &buf[start..end.min(start + CONTENT_WINDOW)];
    let trimmed = trim_leading_whitespace(content);
    if trimmed.starts_with(b"<?xml")
        || trimmed.starts_with(b"<xdp:xdp")
        || trimmed.starts_with(b"<template")
        || contains_bytes(content, b"<x:xmpmeta")
        || contains_bytes(content, b"<rdf:RDF")
    {
        return RegionClass::Xml;
    }

    if contains_bytes(dict_window, b"/Metadata") {
        return RegionClass::Metadata;
    }

    RegionClass::Binary
}

fn trim_leading_whitespace(bytes: &[u8]) -> &[u8] {
    let skip = bytes
        .iter()
        .take_while(|byte| byte.is_ascii_whitespace())
        .count();
    &bytes[skip..]
}
