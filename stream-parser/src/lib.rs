//! Incremental parsing of model output that embeds document edit blocks.
//!
//! A message is prose interleaved with blocks such as
//! `<write_to_file><content>...</content></write_to_file>`. The pull API
//! ([`parse`], [`parse_streaming`], [`feed`]) re-parses the accumulated text on
//! every call; [`EditBlockStreamParser`] consumes deltas instead.

mod document_edit;
mod edit_state;
mod edit_stream;
mod segment;
mod stream_text;
mod tag_scanner;
mod utf8_stream;

pub use document_edit::EditError;
pub use document_edit::EditFeed;
pub use document_edit::ExtractedEdit;
pub use document_edit::ReducedDirective;
pub use document_edit::feed;
pub use edit_state::EditTagState;
pub use edit_state::classify;
pub use edit_state::classify_block;
pub use edit_state::extract_block_content;
pub use edit_state::extract_content;
pub use edit_stream::EditBlockStreamParser;
pub use segment::EditSegment;
pub use segment::Segment;
pub use segment::parse;
pub use segment::parse_streaming;
pub use segment::strip_edit_blocks;
pub use stream_text::StreamTextChunk;
pub use stream_text::StreamTextParser;
pub use tag_scanner::BlockMatch;
pub use tag_scanner::BlockScanner;
pub use tag_scanner::CONTENT_CLOSE;
pub use tag_scanner::CONTENT_OPEN;
pub use tag_scanner::EditBlockKind;
pub use tag_scanner::EditTag;
pub use tag_scanner::TagMatch;
pub use tag_scanner::find_matching_block;
pub use tag_scanner::find_open_incomplete_block;
pub use tag_scanner::find_outer_close;
pub use tag_scanner::find_outer_open;
pub use tag_scanner::has_content_close;
pub use tag_scanner::has_content_open;
pub use tag_scanner::open_tag_prefix_suffix_len;
pub use utf8_stream::Utf8StreamParser;
pub use utf8_stream::Utf8StreamParserError;
