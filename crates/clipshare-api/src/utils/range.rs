//! `Range` header handling for local media serving.

use axum::http::HeaderValue;

/// How a `Range` request applies to a file of known size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRequest {
    /// No usable range: serve the whole file with 200
    Full,
    /// Inclusive byte range within the file
    Partial { start: u64, end: u64 },
    /// Starts at or past the end of the file: 416
    Unsatisfiable,
}

impl RangeRequest {
    pub fn from_header(value: Option<&HeaderValue>, size: u64) -> Self {
        let Some((start, end)) = value.and_then(|v| parse_range_header(v, size)) else {
            return RangeRequest::Full;
        };

        if start >= size {
            return RangeRequest::Unsatisfiable;
        }

        RangeRequest::Partial {
            start,
            end: end.min(size.saturating_sub(1)),
        }
    }
}

/// Parse a single `bytes=` range. Multi-range and malformed values yield `None`.
fn parse_range_header(value: &HeaderValue, size: u64) -> Option<(u64, u64)> {
    let value = value.to_str().ok()?.trim();
    let (unit, range) = value.split_once('=')?;
    if unit.trim() != "bytes" {
        return None;
    }
    let range = range.trim();
    if range.is_empty() || range.contains(',') {
        return None;
    }
    let (start_str, end_str) = range.split_once('-')?;
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    if start_str.is_empty() {
        // Suffix range: "-N" means last N bytes.
        let suffix_len: u64 = end_str.parse().ok()?;
        if suffix_len == 0 {
            return None;
        }
        if suffix_len >= size {
            return Some((0, size.saturating_sub(1)));
        }
        return Some((size - suffix_len, size - 1));
    }

    let start: u64 = start_str.parse().ok()?;
    let end = if end_str.is_empty() {
        size.saturating_sub(1)
    } else {
        end_str.parse().ok()?
    };
    if end < start {
        return None;
    }
    Some((start, end))
}
