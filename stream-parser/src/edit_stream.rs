use crate::ExtractedEdit;
use crate::StreamTextChunk;
use crate::StreamTextParser;
use crate::segment::EditSegment;
use crate::segment::Segment;
use crate::segment::parse_streaming;
use crate::tag_scanner::EditTag;
use crate::tag_scanner::find_ignore_ascii_case;
use crate::tag_scanner::open_tag_prefix_suffix_len;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveBlock {
    tag: EditTag,
    /// Offset in `pending` from which the closing tag can still appear.
    close_search_from: usize,
}

/// Push-based parser for callers that receive deltas rather than the whole
/// message.
///
/// Prose is released as visible text as soon as it cannot be the start of an
/// opening tag; edit blocks are buffered and emitted as [`ExtractedEdit`]s
/// once their closing tag arrives.
///
/// Example:
/// - input: `Sure. <write_to_file><content>doc</content></write_to_file> Done.`
/// - visible output: `Sure.  Done.`
/// - extracted: one full-rewrite edit with content `doc`
///
/// A block is entered at the earliest opening tag. If the stream ends inside
/// it, [`Self::finish`] re-parses the buffered tail so complete blocks nested
/// after a dangling tag are still recovered, and the unterminated block can
/// be fetched with [`Self::take_incomplete`].
#[derive(Debug, Default)]
pub struct EditBlockStreamParser {
    pending: String,
    active: Option<ActiveBlock>,
    incomplete: Option<EditSegment>,
}

impl EditBlockStreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while an opening tag has been seen and its closing tag has not.
    pub fn has_open_block(&self) -> bool {
        self.active.is_some()
    }

    /// Snapshot of the block currently streaming in, for progressive rendering.
    pub fn open_block(&self) -> Option<EditSegment> {
        self.active
            .map(|active| EditSegment::from_raw(active.tag, &self.pending))
    }

    /// The block left unterminated at [`Self::finish`], if any.
    pub fn take_incomplete(&mut self) -> Option<EditSegment> {
        self.incomplete.take()
    }

    fn find_next_open(&self) -> Option<(usize, EditTag)> {
        EditTag::PRIORITY
            .iter()
            .filter_map(|&tag| {
                find_ignore_ascii_case(&self.pending, tag.open(), 0).map(|pos| (pos, tag))
            })
            .min_by_key(|(pos, _)| *pos)
    }
}

impl StreamTextParser for EditBlockStreamParser {
    type Extracted = ExtractedEdit;

    fn push_str(&mut self, chunk: &str) -> StreamTextChunk<Self::Extracted> {
        self.pending.push_str(chunk);
        let mut out = StreamTextChunk::default();

        loop {
            if let Some(active) = self.active {
                let close = active.tag.close();
                if let Some(close_idx) =
                    find_ignore_ascii_case(&self.pending, close, active.close_search_from)
                {
                    let end = close_idx + close.len();
                    let block = EditSegment::from_raw(active.tag, &self.pending[..end]);
                    out.extracted.push(ExtractedEdit::from_segment(&block));
                    self.pending.drain(..end);
                    self.active = None;
                    continue;
                }

                let resume = self.pending.len().saturating_sub(close.len() - 1);
                self.active = Some(ActiveBlock {
                    close_search_from: resume.max(active.close_search_from),
                    ..active
                });
                break;
            }

            if let Some((open_idx, tag)) = self.find_next_open() {
                out.visible_text.push_str(&self.pending[..open_idx]);
                self.pending.drain(..open_idx);
                self.active = Some(ActiveBlock {
                    tag,
                    close_search_from: tag.open().len(),
                });
                continue;
            }

            let keep = open_tag_prefix_suffix_len(&self.pending);
            let take = self.pending.len() - keep;
            out.visible_text.push_str(&self.pending[..take]);
            self.pending.drain(..take);
            break;
        }

        out
    }

    fn finish(&mut self) -> StreamTextChunk<Self::Extracted> {
        let mut out = StreamTextChunk::default();
        self.active = None;
        let pending = std::mem::take(&mut self.pending);

        for segment in parse_streaming(&pending) {
            match segment {
                Segment::Text(text) => out.visible_text.push_str(&text),
                Segment::Edit(edit) if edit.is_completed() => {
                    out.extracted.push(ExtractedEdit::from_segment(&edit));
                }
                Segment::Edit(edit) => self.incomplete = Some(edit),
            }
        }

        out
    }
}
