//! Span-based source editing
//!
//! The writer never regenerates a whole file. Each update is a set of
//! non-overlapping span replacements against the original text; bytes
//! between edits are copied verbatim, which is what keeps untouched
//! developer code and formatting stable across a read-modify-write.

use crate::error::{WriteError, WriteResult};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
pub struct TextEdit {
    pub span: Range<usize>,
    pub replacement: String,
}

impl TextEdit {
    pub fn replace(span: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            span: at..at,
            replacement: text.into(),
        }
    }

    pub fn delete(span: Range<usize>) -> Self {
        Self {
            span,
            replacement: String::new(),
        }
    }
}

/// Apply edits to `source`, verbatim-copying everything between them.
///
/// Edits are sorted by position; the sort is stable, so insertions at
/// the same offset land in push order. Overlap is an error.
pub fn apply_edits(source: &str, mut edits: Vec<TextEdit>) -> WriteResult<String> {
    edits.sort_by_key(|edit| (edit.span.start, edit.span.end));

    for edit in &edits {
        if edit.span.end > source.len() || edit.span.start > edit.span.end {
            return Err(WriteError::EditOutOfBounds {
                start: edit.span.start,
                end: edit.span.end,
                len: source.len(),
            });
        }
    }
    for pair in edits.windows(2) {
        if pair[1].span.start < pair[0].span.end {
            return Err(WriteError::OverlappingEdits {
                first_start: pair[0].span.start,
                first_end: pair[0].span.end,
                second_start: pair[1].span.start,
                second_end: pair[1].span.end,
            });
        }
    }

    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    for edit in &edits {
        out.push_str(&source[last..edit.span.start]);
        out.push_str(&edit.replacement);
        last = edit.span.end;
    }
    out.push_str(&source[last..]);
    Ok(out)
}
