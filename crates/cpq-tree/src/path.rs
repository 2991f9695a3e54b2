//! Dotted path parsing.

use crate::error::BuildError;

/// Segment separator in configuration paths.
pub const SEPARATOR: char = '.';

/// A validated path split into its segments, root first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath<'a> {
    segments: Vec<&'a str>,
}

impl<'a> ParsedPath<'a> {
    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The last segment, which receives the row's terminal type and leaf.
    pub fn terminal(&self) -> &'a str {
        // parse_path never yields an empty segment list
        self.segments.last().copied().unwrap_or_default()
    }
}

/// Split `path` on `.` and validate it.
///
/// `row` is the 1-based row number used in error context. The whole path is
/// trimmed; individual segments are kept verbatim but must not be blank, and
/// the segment count must lie within `min_depth..=max_depth`.
pub fn parse_path(
    row: usize,
    path: &str,
    min_depth: usize,
    max_depth: usize,
) -> Result<ParsedPath<'_>, BuildError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(BuildError::EmptyPath { row });
    }

    let segments: Vec<&str> = trimmed.split(SEPARATOR).collect();
    if let Some(position) = segments.iter().position(|s| s.trim().is_empty()) {
        return Err(BuildError::EmptySegment {
            row,
            path: trimmed.to_string(),
            position,
        });
    }

    if segments.len() < min_depth {
        return Err(BuildError::PathTooShallow {
            row,
            path: trimmed.to_string(),
            depth: segments.len(),
            min_depth,
        });
    }

    if segments.len() > max_depth {
        return Err(BuildError::PathTooDeep {
            row,
            path: trimmed.to_string(),
            depth: segments.len(),
            max_depth,
        });
    }

    Ok(ParsedPath { segments })
}

/// Display form of a segment: first character upper-cased, the rest as-is.
pub fn display_name(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
