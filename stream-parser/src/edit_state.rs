use serde::Serialize;

use crate::tag_scanner::CONTENT_CLOSE;
use crate::tag_scanner::CONTENT_OPEN;
use crate::tag_scanner::EditTag;
use crate::tag_scanner::TagMatch;
use crate::tag_scanner::find_ignore_ascii_case;
use crate::tag_scanner::find_outer_close;
use crate::tag_scanner::find_outer_open;
use crate::tag_scanner::has_content_open;
use crate::tag_scanner::longest_suffix_prefix_len;

/// Lifecycle of one edit block as seen in the text streamed so far.
///
/// Ordered: a block only ever moves forward through these states as its text grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditTagState {
    /// No recognized opening tag.
    None,
    /// Opening tag seen, `<content>` not yet.
    Waiting,
    /// `<content>` seen, closing tag not yet.
    ContentStarted,
    /// Closing outer tag seen.
    Completed,
}

impl EditTagState {
    pub fn as_str(self) -> &'static str {
        match self {
            EditTagState::None => "NONE",
            EditTagState::Waiting => "WAITING",
            EditTagState::ContentStarted => "CONTENT_STARTED",
            EditTagState::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for EditTagState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
enum Signal {
    OuterClose,
    ContentOpen,
}

/// Checked in order after an opening tag is found; the first signal present
/// decides the state. Closing tag beats everything so a block with malformed
/// content tags still completes, and `<content>` anywhere in the text is
/// enough to start rendering before `</content>` arrives.
const CASCADE: [(Signal, EditTagState); 2] = [
    (Signal::OuterClose, EditTagState::Completed),
    (Signal::ContentOpen, EditTagState::ContentStarted),
];

impl Signal {
    fn present(self, text: &str, open: TagMatch) -> bool {
        match self {
            Signal::OuterClose => find_outer_close(text, open.tag, open.body_start()).is_some(),
            Signal::ContentOpen => has_content_open(text),
        }
    }
}

/// Classify `text`, picking the outer tag by spelling priority.
pub fn classify(text: &str) -> EditTagState {
    match find_outer_open(text, 0) {
        Some(open) => classify_after_open(text, open),
        None => EditTagState::None,
    }
}

/// Classify `text` as a block wrapped in `tag`.
///
/// Used when the wrapper is already known, so a block whose body happens to
/// mention another tag spelling is judged by its real wrapper.
pub fn classify_block(text: &str, tag: EditTag) -> EditTagState {
    match find_ignore_ascii_case(text, tag.open(), 0) {
        Some(index) => classify_after_open(text, TagMatch { tag, index }),
        None => EditTagState::None,
    }
}

fn classify_after_open(text: &str, open: TagMatch) -> EditTagState {
    CASCADE
        .iter()
        .find(|(signal, _)| signal.present(text, open))
        .map_or(EditTagState::Waiting, |(_, state)| *state)
}

/// Content of the block in `text`, or whatever of it has arrived so far.
///
/// - no `<content>`: empty;
/// - `<content>` without `</content>`: everything after it, minus a trailing
///   fragment that may be the start of `</content>`;
/// - both: the text between them, located after the outer opening tag chosen
///   by spelling priority.
///
/// One newline directly after `<content>` and one directly before
/// `</content>` belong to the tag layout and are dropped, so the result is not
/// byte-exact: `"<content>\nBody\n\n</content>"` yields `"Body\n"`. The
/// verbatim block is available as [`crate::EditSegment::raw`].
pub fn extract_content(text: &str) -> String {
    content_after(text, find_outer_open(text, 0))
}

/// [`extract_content`] for a block whose wrapper is already known.
pub fn extract_block_content(text: &str, tag: EditTag) -> String {
    let open = find_ignore_ascii_case(text, tag.open(), 0).map(|index| TagMatch { tag, index });
    content_after(text, open)
}

fn content_after(text: &str, open: Option<TagMatch>) -> String {
    let Some(content_open) = find_ignore_ascii_case(text, CONTENT_OPEN, 0) else {
        return String::new();
    };
    let body_start = content_open + CONTENT_OPEN.len();

    if find_ignore_ascii_case(text, CONTENT_CLOSE, body_start).is_none() {
        let body = &text[body_start..];
        let keep = longest_suffix_prefix_len(body, CONTENT_CLOSE);
        return strip_leading_newline(&body[..body.len() - keep]).to_string();
    }

    open.and_then(|open| content_within_block(text, open))
        .or_else(|| {
            find_ignore_ascii_case(text, CONTENT_CLOSE, body_start)
                .map(|close| trim_layout_newlines(&text[body_start..close]))
        })
        .map(str::to_string)
        .unwrap_or_default()
}

fn content_within_block(text: &str, open: TagMatch) -> Option<&str> {
    let content_open = find_ignore_ascii_case(text, CONTENT_OPEN, open.body_start())?;
    let body_start = content_open + CONTENT_OPEN.len();
    let content_close = find_ignore_ascii_case(text, CONTENT_CLOSE, body_start)?;
    if let Some(outer_close) = find_outer_close(text, open.tag, open.body_start())
        && content_close > outer_close
    {
        return None;
    }
    Some(trim_layout_newlines(&text[body_start..content_close]))
}

fn strip_leading_newline(text: &str) -> &str {
    text.strip_prefix("\r\n")
        .or_else(|| text.strip_prefix('\n'))
        .unwrap_or(text)
}

fn trim_layout_newlines(text: &str) -> &str {
    let text = strip_leading_newline(text);
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}
