//! Length-preserving rewrite primitives.
//!
//! A PDF cross-reference table stores the absolute byte offset of every
//! indirect object, so any insertion or deletion invalidates the file.
//! Every primitive here replaces a span with a same-length substitution,
//! keeping all recorded offsets valid.

use std::ops::Range;

use crate::error::{Error, Result};

/// Inert replacement for a rewritten URL.
pub const URL_SENTINEL: &[u8] = b"about:blank";

const PAD: u8 = b' ';

/// Set every byte in the span to ASCII space.
pub fn blank(buf: &mut [u8], span: Range<usize>) -> Result<()> {
    check_span(buf, &span)?;
    for byte in &mut buf[span] {
        *byte = PAD;
    }
    Ok(())
}

/// Copy `replacement` into the span, padding the tail with spaces.
/// A replacement longer than the span is rejected.
pub fn substitute(buf: &mut [u8], span: Range<usize>, replacement: &[u8]) -> Result<()> {
    check_span(buf, &span)?;
    if replacement.len() > span.len() {
        return Err(Error::ReplacementTooLong {
            replacement: replacement.len(),
            span: span.len(),
        });
    }
    let target = &mut buf[span];
    target[..replacement.len()].copy_from_slice(replacement);
    for byte in &mut target[replacement.len()..] {
        *byte = PAD;
    }
    Ok(())
}

/// Write `about:blank` followed by spaces over a URL span. A span too
/// short to hold the sentinel is blanked instead; either way the URL is
/// gone and the length unchanged.
pub fn pad_url(buf: &mut [u8], span: Range<usize>) -> Result<()> {
    if span.len() < URL_SENTINEL.len() {
        blank(buf, span)
    } else {
        substitute(buf, span, URL_SENTINEL)
    }
}

fn check_span(buf: &[u8], span: &Range<usize>) -> Result<()> {
    if span.start > span.end || span.end > buf.len() {
        return Err(Error::SpanOutOfRange {
            start: span.start,
            end: span.end,
            len: buf.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fills_span_with_spaces() {
        let mut buf = b"keep/OpenAction 3 0 Rkeep".to_vec();
        blank(&mut buf, 4..21).unwrap();
        assert_eq!(&buf, b"keep                 keep");
        assert_eq!(buf.len(), 25);
    }

    #[test]
    fn substitute_pads_short_replacement() {
        let mut buf = b"xx/Names <</JavaScript <<>>>>yy".to_vec();
        substitute(&mut buf, 2..29, b"/Names<<>>").unwrap();
        assert_eq!(&buf, b"xx/Names<<>>                 yy");
    }

    #[test]
    fn substitute_rejects_oversized_replacement() {
        let mut buf = b"/S /URI".to_vec();
        let err = substitute(&mut buf, 0..7, b"/S /NextPlus").unwrap_err();
        assert!(matches!(err, Error::ReplacementTooLong { replacement: 12, span: 7 }));
        assert_eq!(&buf, b"/S /URI"); // untouched on rejection
    }

    #[test]
    fn pad_url_writes_sentinel_then_spaces() {
        let mut buf = b"(http://evil.example/collect)".to_vec();
        pad_url(&mut buf, 1..28).unwrap();
        assert_eq!(&buf, b"(about:blank                )");
    }

    #[test]
    fn pad_url_blanks_span_shorter_than_sentinel() {
        let mut buf = b"(http://x)".to_vec();
        pad_url(&mut buf, 1..9).unwrap();
        assert_eq!(&buf, b"(        )");
    }

    #[test]
    fn out_of_range_span_is_an_error() {
        let mut buf = b"abc".to_vec();
        assert!(blank(&mut buf, 1..9).is_err());
        assert!(substitute(&mut buf, 4..4, b"").is_err());
    }
}
