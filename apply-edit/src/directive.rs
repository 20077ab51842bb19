//! Line scanner for SEARCH/REPLACE directive blocks.
//!
//! A directive is three marker lines with free text in between:
//!
//! ```text
//! <<<<<<< SEARCH
//! text to find
//! =======
//! replacement text
//! >>>>>>> REPLACE
//! ```
//!
//! Markers are case-sensitive and must sit alone on their line (surrounding
//! whitespace is ignored). The scan is a single forward pass over the lines,
//! so adversarial input with many near-miss markers stays linear.

use serde::Serialize;

pub const SEARCH_MARKER: &str = "<<<<<<< SEARCH";
pub const DIVIDER_MARKER: &str = "=======";
pub const REPLACE_MARKER: &str = ">>>>>>> REPLACE";

/// One SEARCH/REPLACE pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffDirective {
    pub search: String,
    pub replace: String,
}

/// Trailing directive that has not seen its closing marker yet.
///
/// `replace` is `None` until the divider line arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialDirective {
    pub search: String,
    pub replace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DirectiveScan {
    pub complete: Vec<DiffDirective>,
    pub partial: Option<PartialDirective>,
}

#[derive(Debug, Clone, Copy)]
enum ScanState {
    Idle,
    InSearch {
        search_start: usize,
    },
    InReplace {
        search_start: usize,
        search_end: usize,
        replace_start: usize,
    },
}

/// Extract every complete directive from `instructions`, in order.
///
/// Text outside directives is ignored. A directive that never reaches its
/// `>>>>>>> REPLACE` line is dropped.
pub fn extract_directives(instructions: &str) -> Vec<DiffDirective> {
    scan_directives(instructions).complete
}

/// Scan `instructions` and also report the unterminated trailing directive, if any.
///
/// Intended for rendering a diff while it is still streaming in. A last line
/// that is only the beginning of the marker the scanner is waiting for is left
/// out of the partial text.
pub fn scan_directives(instructions: &str) -> DirectiveScan {
    let mut scan = DirectiveScan::default();
    let mut state = ScanState::Idle;
    let mut offset = 0usize;

    for line in instructions.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let marker = line.trim();

        state = match state {
            ScanState::Idle if marker == SEARCH_MARKER => ScanState::InSearch {
                search_start: offset,
            },
            ScanState::InSearch { search_start } if marker == DIVIDER_MARKER => {
                ScanState::InReplace {
                    search_start,
                    search_end: line_start,
                    replace_start: offset,
                }
            }
            ScanState::InReplace {
                search_start,
                search_end,
                replace_start,
            } if marker == REPLACE_MARKER => {
                scan.complete.push(DiffDirective {
                    search: instructions[search_start..search_end].trim().to_string(),
                    replace: instructions[replace_start..line_start].trim().to_string(),
                });
                ScanState::Idle
            }
            other => other,
        };
    }

    scan.partial = match state {
        ScanState::Idle => None,
        ScanState::InSearch { search_start } => {
            let end = without_pending_marker(instructions, search_start, DIVIDER_MARKER);
            Some(PartialDirective {
                search: instructions[search_start..end].trim().to_string(),
                replace: None,
            })
        }
        ScanState::InReplace {
            search_start,
            search_end,
            replace_start,
        } => {
            let end = without_pending_marker(instructions, replace_start, REPLACE_MARKER);
            Some(PartialDirective {
                search: instructions[search_start..search_end].trim().to_string(),
                replace: Some(instructions[replace_start..end].trim().to_string()),
            })
        }
    };

    scan
}

/// End offset of the partial body, excluding an unterminated last line that
/// could still grow into `marker`.
fn without_pending_marker(text: &str, body_start: usize, marker: &str) -> usize {
    let body = &text[body_start..];
    if body.ends_with('\n') {
        return text.len();
    }
    let last_line_start = body.rfind('\n').map_or(body_start, |idx| body_start + idx + 1);
    let last_line = text[last_line_start..].trim();
    if !last_line.is_empty() && marker.starts_with(last_line) {
        last_line_start
    } else {
        text.len()
    }
}
