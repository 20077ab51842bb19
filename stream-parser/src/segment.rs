use docedit_apply_edit::DirectiveScan;
use docedit_apply_edit::scan_directives;
use serde::Serialize;

use crate::edit_state::EditTagState;
use crate::edit_state::classify_block;
use crate::edit_state::extract_block_content;
use crate::tag_scanner::EditBlockKind;
use crate::tag_scanner::EditTag;
use crate::tag_scanner::BlockScanner;
use crate::tag_scanner::find_open_incomplete_block;
use crate::tag_scanner::find_outer_open;

/// One edit block, complete or still streaming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditSegment {
    pub tag: EditTag,
    pub state: EditTagState,
    /// Verbatim block text, tags included.
    pub raw: String,
    /// Text inside `<content>`, or the part of it received so far.
    pub content: String,
}

impl EditSegment {
    pub(crate) fn from_raw(tag: EditTag, raw: &str) -> Self {
        Self {
            tag,
            state: classify_block(raw, tag),
            raw: raw.to_string(),
            content: extract_block_content(raw, tag),
        }
    }

    pub fn kind(&self) -> EditBlockKind {
        self.tag.block_kind()
    }

    pub fn is_completed(&self) -> bool {
        self.state == EditTagState::Completed
    }

    /// SEARCH/REPLACE directives in the content, including one still being
    /// streamed. Empty for full-rewrite blocks.
    pub fn scan_directives(&self) -> DirectiveScan {
        match self.kind() {
            EditBlockKind::SearchReplace => scan_directives(&self.content),
            EditBlockKind::FullDocument => DirectiveScan::default(),
        }
    }
}

/// A span of a model message: prose or an edit block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "segment", rename_all = "snake_case")]
pub enum Segment {
    Text(String),
    Edit(EditSegment),
}

impl Segment {
    /// Verbatim source span. Concatenating these over a parse result yields
    /// the parsed input.
    pub fn raw_text(&self) -> &str {
        match self {
            Segment::Text(text) => text,
            Segment::Edit(edit) => &edit.raw,
        }
    }

    pub fn as_edit(&self) -> Option<&EditSegment> {
        match self {
            Segment::Text(_) => None,
            Segment::Edit(edit) => Some(edit),
        }
    }

    /// Whitespace-only prose, typically the gap between two blocks. Renderers
    /// usually skip these.
    pub fn is_blank(&self) -> bool {
        matches!(self, Segment::Text(text) if text.trim().is_empty())
    }
}

/// Split a complete message into prose and complete edit blocks.
///
/// An opening tag that never closes stays part of the surrounding prose.
pub fn parse(text: &str) -> Vec<Segment> {
    parse_segments(text, false)
}

/// Like [`parse`], but a trailing block whose closing tag has not arrived yet
/// is returned as an [`EditSegment`] in state `Waiting` or `ContentStarted`,
/// so it can be rendered while it streams in.
pub fn parse_streaming(text: &str) -> Vec<Segment> {
    parse_segments(text, true)
}

/// Visible prose only: every edit block, including an unterminated trailing
/// one, removed.
pub fn strip_edit_blocks(text: &str) -> String {
    parse_streaming(text)
        .iter()
        .filter_map(|segment| match segment {
            Segment::Text(text) => Some(text.as_str()),
            Segment::Edit(_) => None,
        })
        .collect()
}

fn parse_segments(text: &str, streaming: bool) -> Vec<Segment> {
    let mut segments = Vec::new();
    if find_outer_open(text, 0).is_none() {
        push_text(&mut segments, text);
        return segments;
    }

    let mut cursor = 0;
    for block in BlockScanner::new(text, 0) {
        push_text(&mut segments, &text[cursor..block.start]);
        segments.push(Segment::Edit(EditSegment::from_raw(
            block.tag,
            block.as_str(text),
        )));
        cursor = block.end;
    }

    if streaming && let Some(open) = find_open_incomplete_block(text, cursor) {
        push_text(&mut segments, &text[cursor..open.index]);
        segments.push(Segment::Edit(EditSegment::from_raw(
            open.tag,
            &text[open.index..],
        )));
        return segments;
    }

    push_text(&mut segments, &text[cursor..]);
    segments
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if !text.is_empty() {
        segments.push(Segment::Text(text.to_string()));
    }
}
