//! Entry point for callers that hold the accumulated model output.

use docedit_apply_edit::DiffDirective;
use docedit_apply_edit::ReducedDiff;
use docedit_apply_edit::reduce;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use tracing::warn;

use crate::edit_state::EditTagState;
use crate::segment::EditSegment;
use crate::segment::Segment;
use crate::segment::parse;
use crate::segment::parse_streaming;
use crate::tag_scanner::EditBlockKind;
use crate::tag_scanner::EditTag;

#[derive(Debug, Error)]
pub enum EditError {
    /// The final message ends inside an edit block: the response was cut off.
    #[error("response ended inside an unterminated <{tag}> block (state {state})")]
    IncompleteEdit {
        tag: EditTag,
        state: EditTagState,
        partial_content: String,
    },
}

/// A directive together with its display reduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReducedDirective {
    pub directive: DiffDirective,
    pub reduced: ReducedDiff,
}

/// A completed edit block, ready for approval and application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedEdit {
    pub tag: EditTag,
    pub kind: EditBlockKind,
    pub content: String,
    /// Empty for full-rewrite blocks.
    pub directives: Vec<ReducedDirective>,
}

impl ExtractedEdit {
    pub fn from_segment(segment: &EditSegment) -> Self {
        let directives: Vec<ReducedDirective> = segment
            .scan_directives()
            .complete
            .into_iter()
            .map(|directive| {
                let reduced = reduce(&directive.search, &directive.replace);
                ReducedDirective { directive, reduced }
            })
            .collect();
        if segment.kind() == EditBlockKind::SearchReplace && directives.is_empty() {
            debug!(tag = %segment.tag, "diff block contains no SEARCH/REPLACE directives");
        }
        Self {
            tag: segment.tag,
            kind: segment.kind(),
            content: segment.content.clone(),
            directives,
        }
    }

    /// The raw directives, for handing to the applier.
    pub fn diff_directives(&self) -> Vec<DiffDirective> {
        self.directives
            .iter()
            .map(|reduced| reduced.directive.clone())
            .collect()
    }
}

/// Snapshot of a message's edit structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditFeed {
    pub segments: Vec<Segment>,
    /// The last segment is an edit block that has not closed yet.
    pub has_open_edit: bool,
    pub completed_edits: Vec<ExtractedEdit>,
}

impl EditFeed {
    pub fn open_edit(&self) -> Option<&EditSegment> {
        if !self.has_open_edit {
            return None;
        }
        self.segments.last().and_then(Segment::as_edit)
    }
}

/// Parse everything received so far.
///
/// Pass the full accumulated text on every call, not the latest delta; the
/// result depends only on the arguments. While streaming (`is_final == false`)
/// a trailing unterminated block is reported through `has_open_edit`. Once
/// the stream is final, such a block is an [`EditError::IncompleteEdit`].
pub fn feed(text: &str, is_final: bool) -> Result<EditFeed, EditError> {
    let streaming = parse_streaming(text);
    let open = trailing_open_edit(&streaming);

    if is_final {
        if let Some(open) = open {
            warn!(
                tag = %open.tag,
                state = ?open.state,
                "model response ended inside an edit block"
            );
            return Err(EditError::IncompleteEdit {
                tag: open.tag,
                state: open.state,
                partial_content: open.content.clone(),
            });
        }
        return Ok(build_feed(parse(text), false));
    }

    let has_open_edit = open.is_some();
    Ok(build_feed(streaming, has_open_edit))
}

fn trailing_open_edit(segments: &[Segment]) -> Option<&EditSegment> {
    segments
        .last()
        .and_then(Segment::as_edit)
        .filter(|edit| !edit.is_completed())
}

fn build_feed(segments: Vec<Segment>, has_open_edit: bool) -> EditFeed {
    let completed_edits = segments
        .iter()
        .filter_map(Segment::as_edit)
        .filter(|edit| edit.is_completed())
        .map(ExtractedEdit::from_segment)
        .collect();
    EditFeed {
        segments,
        has_open_edit,
        completed_edits,
    }
}
