// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Parsing of "Key: Value" header blocks

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};
use crate::fetch::HeaderEntry;

/// Header name the `user_agent` option writes to
pub const USER_AGENT: &str = "User-Agent";

lazy_static! {
    // CRLF must come first so it is not split into two separators.
    static ref LINE_BREAK: Regex = Regex::new(r"\r\n|\r|\n").unwrap();
}

/// Split a header block on CRLF, CR or LF into its non-empty segments
pub fn split_lines(block: &str) -> impl Iterator<Item = &str> {
    LINE_BREAK
        .split(block)
        .filter(|segment| !segment.trim().is_empty())
}

/// Parse a single "Key: Value" line, splitting on the first `:`
///
/// Returns `None` when there is no separator or the key is empty.
pub fn parse_header_line(line: &str) -> Option<HeaderEntry> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some(HeaderEntry::new(key, value.trim()))
}

/// Parse a header block, skipping malformed segments
pub fn parse_header_block(block: &str) -> Vec<HeaderEntry> {
    split_lines(block)
        .filter_map(|segment| {
            let entry = parse_header_line(segment);
            if entry.is_none() {
                tracing::warn!(segment = %segment, "Skipping malformed header segment");
            }
            entry
        })
        .collect()
}

/// Parse a header block, failing on the first malformed segment
pub fn try_parse_header_block(block: &str) -> Result<Vec<HeaderEntry>> {
    split_lines(block)
        .map(|segment| {
            parse_header_line(segment).ok_or_else(|| Error::MalformedHeader {
                segment: segment.to_string(),
            })
        })
        .collect()
}

/// Write a user agent into a header list
///
/// An existing `User-Agent` entry (any case) gets its value replaced in
/// place, otherwise a new entry is appended.
pub fn apply_user_agent(headers: &mut Vec<HeaderEntry>, user_agent: &str) {
    match headers
        .iter_mut()
        .find(|h| h.key.eq_ignore_ascii_case(USER_AGENT))
    {
        Some(existing) => existing.value = user_agent.to_string(),
        None => headers.push(HeaderEntry::new(USER_AGENT, user_agent)),
    }
}
