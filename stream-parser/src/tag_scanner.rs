//! Locates edit-block tags in a (possibly truncated) text buffer.
//!
//! All lookups are pure functions of the buffer and a start offset. Matching
//! is ASCII case-insensitive and byte-wise; every tag starts with `<`, which
//! never occurs inside a multi-byte UTF-8 sequence, so returned offsets are
//! always char boundaries and `from` may be any byte offset.

use serde::Serialize;

pub const CONTENT_OPEN: &str = "<content>";
pub const CONTENT_CLOSE: &str = "</content>";

/// Outer tag spelling that wraps an edit block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditTag {
    /// Preferred full-rewrite form.
    WriteToFile,
    /// Diff form carrying SEARCH/REPLACE directives.
    ReplaceInFile,
    /// Legacy full-rewrite form.
    DocumentEdit,
}

/// What an edit block's content means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditBlockKind {
    FullDocument,
    SearchReplace,
}

impl EditTag {
    /// Lookup order used when a buffer is asked for "the" outer tag.
    pub const PRIORITY: [EditTag; 3] = [
        EditTag::WriteToFile,
        EditTag::ReplaceInFile,
        EditTag::DocumentEdit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EditTag::WriteToFile => "write_to_file",
            EditTag::ReplaceInFile => "replace_in_file",
            EditTag::DocumentEdit => "document_edit",
        }
    }

    pub fn open(self) -> &'static str {
        match self {
            EditTag::WriteToFile => "<write_to_file>",
            EditTag::ReplaceInFile => "<replace_in_file>",
            EditTag::DocumentEdit => "<document_edit>",
        }
    }

    pub fn close(self) -> &'static str {
        match self {
            EditTag::WriteToFile => "</write_to_file>",
            EditTag::ReplaceInFile => "</replace_in_file>",
            EditTag::DocumentEdit => "</document_edit>",
        }
    }

    pub fn block_kind(self) -> EditBlockKind {
        match self {
            EditTag::WriteToFile | EditTag::DocumentEdit => EditBlockKind::FullDocument,
            EditTag::ReplaceInFile => EditBlockKind::SearchReplace,
        }
    }
}

impl std::fmt::Display for EditTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An opening tag found in a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagMatch {
    pub tag: EditTag,
    pub index: usize,
}

impl TagMatch {
    /// Offset just past the opening tag.
    pub fn body_start(self) -> usize {
        self.index + self.tag.open().len()
    }
}

/// A complete `<outer>...</outer>` span, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockMatch {
    pub tag: EditTag,
    pub start: usize,
    pub end: usize,
}

impl BlockMatch {
    pub fn as_str<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// First opening tag at or after `from`, chosen by fixed spelling priority
/// (write_to_file, then replace_in_file, then document_edit) rather than by
/// position: a later `<write_to_file>` wins over an earlier `<document_edit>`.
pub fn find_outer_open(text: &str, from: usize) -> Option<TagMatch> {
    EditTag::PRIORITY.iter().find_map(|&tag| {
        find_ignore_ascii_case(text, tag.open(), from).map(|index| TagMatch { tag, index })
    })
}

pub fn find_outer_close(text: &str, tag: EditTag, from: usize) -> Option<usize> {
    find_ignore_ascii_case(text, tag.close(), from)
}

/// Earliest complete block starting at or after `from`.
///
/// Opening tags are considered in position order; one whose spelling never
/// closes afterwards is skipped, as is every later opening tag of the same
/// spelling (none of them can close either).
pub fn find_matching_block(text: &str, from: usize) -> Option<BlockMatch> {
    BlockScanner::new(text, from).next()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NextOpen {
    Unknown,
    At(usize),
    /// Absent after the cursor, or present but never closed.
    Exhausted,
}

/// Walks complete blocks left to right.
///
/// The next opening offset of each spelling is cached and only searched
/// again once the cursor has moved past it, and a spelling that cannot
/// close is never searched again. Every byte is therefore visited a bounded
/// number of times per spelling over the whole walk, not once per block.
#[derive(Debug, Clone)]
pub struct BlockScanner<'a> {
    text: &'a str,
    cursor: usize,
    next_open: [NextOpen; 3],
}

impl<'a> BlockScanner<'a> {
    pub fn new(text: &'a str, from: usize) -> Self {
        Self {
            text,
            cursor: from,
            next_open: [NextOpen::Unknown; 3],
        }
    }

    /// Offset just past the last block returned (or the start offset).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn earliest_open(&mut self) -> Option<(usize, TagMatch)> {
        for (slot, &tag) in EditTag::PRIORITY.iter().enumerate() {
            let stale = match self.next_open[slot] {
                NextOpen::Unknown => true,
                NextOpen::At(index) => index < self.cursor,
                NextOpen::Exhausted => false,
            };
            if stale {
                self.next_open[slot] = find_ignore_ascii_case(self.text, tag.open(), self.cursor)
                    .map_or(NextOpen::Exhausted, NextOpen::At);
            }
        }

        EditTag::PRIORITY
            .iter()
            .enumerate()
            .filter_map(|(slot, &tag)| match self.next_open[slot] {
                NextOpen::At(index) => Some((slot, TagMatch { tag, index })),
                NextOpen::Unknown | NextOpen::Exhausted => None,
            })
            .min_by_key(|(_, open)| open.index)
    }
}

impl Iterator for BlockScanner<'_> {
    type Item = BlockMatch;

    fn next(&mut self) -> Option<BlockMatch> {
        loop {
            let (slot, open) = self.earliest_open()?;
            match find_outer_close(self.text, open.tag, open.body_start()) {
                Some(close) => {
                    let end = close + open.tag.close().len();
                    self.cursor = end;
                    return Some(BlockMatch {
                        tag: open.tag,
                        start: open.index,
                        end,
                    });
                }
                None => self.next_open[slot] = NextOpen::Exhausted,
            }
        }
    }
}

/// The open incomplete block: the last opening tag (largest start offset
/// among all spellings) at or after `from`.
///
/// Callers use this after [`find_matching_block`] came up empty, so the tag
/// found here has no closing tag after it.
pub fn find_open_incomplete_block(text: &str, from: usize) -> Option<TagMatch> {
    EditTag::PRIORITY
        .iter()
        .filter_map(|&tag| {
            rfind_ignore_ascii_case(text, tag.open(), from).map(|index| TagMatch { tag, index })
        })
        .max_by_key(|open| open.index)
}

pub fn has_content_open(text: &str) -> bool {
    find_ignore_ascii_case(text, CONTENT_OPEN, 0).is_some()
}

pub fn has_content_close(text: &str) -> bool {
    find_ignore_ascii_case(text, CONTENT_CLOSE, 0).is_some()
}

/// Length of the longest suffix of `text` that could still grow into an
/// opening tag.
pub fn open_tag_prefix_suffix_len(text: &str) -> usize {
    EditTag::PRIORITY
        .iter()
        .map(|tag| longest_suffix_prefix_len(text, tag.open()))
        .max()
        .unwrap_or(0)
}

pub(crate) fn find_ignore_ascii_case(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    let first = *needle.first()?;
    let last = hay.len().checked_sub(needle.len())?;
    (from..=last).find(|&i| {
        hay[i].eq_ignore_ascii_case(&first) && hay[i..i + needle.len()].eq_ignore_ascii_case(needle)
    })
}

pub(crate) fn rfind_ignore_ascii_case(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    let last = hay.len().checked_sub(needle.len())?;
    (from..=last)
        .rev()
        .find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

/// Longest `k < needle.len()` such that `s` ends with the first `k` bytes of
/// `needle`, ignoring ASCII case. `needle` must be ASCII.
pub(crate) fn longest_suffix_prefix_len(s: &str, needle: &str) -> usize {
    let hay = s.as_bytes();
    let max = hay.len().min(needle.len().saturating_sub(1));
    (1..=max)
        .rev()
        .find(|&k| hay[hay.len() - k..].eq_ignore_ascii_case(&needle.as_bytes()[..k]))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::BlockMatch;
    use super::BlockScanner;
    use super::EditBlockKind;
    use super::EditTag;
    use super::TagMatch;
    use super::find_matching_block;
    use super::find_open_incomplete_block;
    use super::find_outer_close;
    use super::find_outer_open;
    use super::has_content_close;
    use super::has_content_open;
    use super::open_tag_prefix_suffix_len;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use std::time::Instant;

    #[test]
    fn tag_spellings_map_to_block_kinds() {
        assert_eq!(EditTag::WriteToFile.block_kind(), EditBlockKind::FullDocument);
        assert_eq!(EditTag::DocumentEdit.block_kind(), EditBlockKind::FullDocument);
        assert_eq!(EditTag::ReplaceInFile.block_kind(), EditBlockKind::SearchReplace);
    }

    #[test]
    fn finds_open_tag_case_insensitively() {
        assert_eq!(
            find_outer_open("intro <Write_To_File><content>", 0),
            Some(TagMatch {
                tag: EditTag::WriteToFile,
                index: 6,
            })
        );
        assert_eq!(find_outer_open("no tags here", 0), None);
    }

    #[test]
    fn open_lookup_uses_spelling_priority_not_position() {
        let text = "<document_edit> stray, then <write_to_file>";
        assert_eq!(
            find_outer_open(text, 0),
            Some(TagMatch {
                tag: EditTag::WriteToFile,
                index: 28,
            })
        );
    }

    #[test]
    fn open_lookup_respects_from() {
        let text = "<replace_in_file>a</replace_in_file><replace_in_file>";
        assert_eq!(
            find_outer_open(text, 1),
            Some(TagMatch {
                tag: EditTag::ReplaceInFile,
                index: 36,
            })
        );
        assert_eq!(find_outer_open(text, 1_000), None);
    }

    #[test]
    fn close_lookup_is_per_spelling() {
        let text = "<write_to_file>x</document_edit></WRITE_TO_FILE>";
        assert_eq!(find_outer_close(text, EditTag::WriteToFile, 0), Some(32));
        assert_eq!(find_outer_close(text, EditTag::ReplaceInFile, 0), None);
    }

    #[test]
    fn matching_block_prefers_earliest_closed_block() {
        let text = "a <document_edit><content>x</content></document_edit> b <write_to_file><content>y</content></write_to_file>";
        let block = find_matching_block(text, 0);
        assert_eq!(
            block,
            Some(BlockMatch {
                tag: EditTag::DocumentEdit,
                start: 2,
                end: 53,
            })
        );
        let next = block.and_then(|block| find_matching_block(text, block.end));
        assert_eq!(next.map(|block| block.tag), Some(EditTag::WriteToFile));
    }

    #[test]
    fn matching_block_skips_spelling_that_never_closes() {
        let text = "<document_edit> dangling <write_to_file>y</write_to_file>";
        let block = find_matching_block(text, 0);
        assert_eq!(block.map(|block| block.tag), Some(EditTag::WriteToFile));
        assert_eq!(
            block.map(|block| block.as_str(text)),
            Some("<write_to_file>y</write_to_file>")
        );
    }

    #[test]
    fn matching_block_requires_close_after_open() {
        assert_eq!(
            find_matching_block("</write_to_file> <write_to_file>open", 0),
            None
        );
    }

    #[test]
    fn incomplete_block_is_last_open_tag() {
        let text = "<write_to_file>one <replace_in_file>two";
        assert_eq!(
            find_open_incomplete_block(text, 0),
            Some(TagMatch {
                tag: EditTag::ReplaceInFile,
                index: 19,
            })
        );
        assert_eq!(find_open_incomplete_block(text, 20), None);
    }

    #[test]
    fn block_scanner_walks_blocks_in_order() {
        let text = "<document_edit> a<write_to_file>1</write_to_file>b<REPLACE_IN_FILE>2</replace_in_file>";
        let mut scanner = BlockScanner::new(text, 0);
        let blocks: Vec<BlockMatch> = scanner.by_ref().collect();
        assert_eq!(
            blocks,
            vec![
                BlockMatch {
                    tag: EditTag::WriteToFile,
                    start: 17,
                    end: 49,
                },
                BlockMatch {
                    tag: EditTag::ReplaceInFile,
                    start: 50,
                    end: text.len(),
                },
            ]
        );
        assert_eq!(scanner.cursor(), text.len());
    }

    #[test]
    fn block_scanner_skips_unclosed_spelling_in_linear_time() {
        let mut text = String::from("<document_edit>");
        for _ in 0..50_000 {
            text.push_str("<write_to_fil <write_to_file>x</write_to_file><document_edit>");
        }

        let started = Instant::now();
        let count = BlockScanner::new(&text, 0).count();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(count, 50_000);
    }

    #[test]
    fn content_checks_are_plain_containment() {
        assert!(has_content_open("<CONTENT>partial"));
        assert!(!has_content_close("<content>partial</cont"));
        assert!(has_content_close("x</content>"));
    }

    #[test]
    fn split_open_tag_suffix_is_detected() {
        assert_eq!(open_tag_prefix_suffix_len("hello <wri"), 4);
        assert_eq!(open_tag_prefix_suffix_len("hello <REPLACE_in"), 11);
        assert_eq!(open_tag_prefix_suffix_len("hello <"), 1);
        assert_eq!(open_tag_prefix_suffix_len("hello"), 0);
        assert_eq!(open_tag_prefix_suffix_len("<write_to_file>"), 0);
    }

    #[test]
    fn scanning_never_panics_on_odd_offsets() {
        let text = "héllo <write_to_file>ü";
        for from in 0..text.len() + 3 {
            let _ = find_outer_open(text, from);
            let _ = find_matching_block(text, from);
            let _ = find_open_incomplete_block(text, from);
        }
        assert_eq!(find_outer_open("", 0), None);
        assert_eq!(open_tag_prefix_suffix_len("é"), 0);
    }
}
