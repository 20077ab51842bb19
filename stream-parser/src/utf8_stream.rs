use thiserror::Error;

use crate::StreamTextChunk;
use crate::StreamTextParser;

/// Error returned by [`Utf8StreamParser`] when streamed bytes are not valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Utf8StreamParserError {
    /// The provided bytes contain an invalid UTF-8 sequence.
    #[error("invalid UTF-8 in streamed bytes at offset {valid_up_to} (error length {error_len})")]
    InvalidUtf8 {
        /// Byte offset in the parser's buffered bytes where decoding failed.
        valid_up_to: usize,
        /// Length in bytes of the invalid sequence.
        error_len: usize,
    },
    /// EOF was reached with a buffered partial UTF-8 code point.
    #[error("incomplete UTF-8 code point at end of stream")]
    IncompleteUtf8AtEof,
}

/// Wraps a [`StreamTextParser`] and accepts raw bytes, buffering partial UTF-8 code points.
///
/// Transport layers hand over bytes; a code point may be split across two
/// reads (for example `0xC3` then `0xA9` for `é`).
#[derive(Debug)]
pub struct Utf8StreamParser<P> {
    inner: P,
    pending_utf8: Vec<u8>,
}

impl<P> Utf8StreamParser<P>
where
    P: StreamTextParser,
{
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            pending_utf8: Vec::new(),
        }
    }

    /// Feed a raw byte chunk.
    ///
    /// On invalid UTF-8 the whole chunk is rolled back, so the inner parser
    /// never sees a prefix of a rejected chunk.
    pub fn push_bytes(
        &mut self,
        chunk: &[u8],
    ) -> Result<StreamTextChunk<P::Extracted>, Utf8StreamParserError> {
        let old_len = self.pending_utf8.len();
        self.pending_utf8.extend_from_slice(chunk);

        let valid_up_to = match std::str::from_utf8(&self.pending_utf8) {
            Ok(_) => self.pending_utf8.len(),
            Err(err) => {
                if let Some(error_len) = err.error_len() {
                    self.pending_utf8.truncate(old_len);
                    return Err(Utf8StreamParserError::InvalidUtf8 {
                        valid_up_to: err.valid_up_to(),
                        error_len,
                    });
                }
                err.valid_up_to()
            }
        };
        if valid_up_to == 0 {
            return Ok(StreamTextChunk::default());
        }

        let out = match std::str::from_utf8(&self.pending_utf8[..valid_up_to]) {
            Ok(text) => self.inner.push_str(text),
            Err(err) => {
                self.pending_utf8.truncate(old_len);
                return Err(Utf8StreamParserError::InvalidUtf8 {
                    valid_up_to: err.valid_up_to(),
                    error_len: err.error_len().unwrap_or(0),
                });
            }
        };
        self.pending_utf8.drain(..valid_up_to);
        Ok(out)
    }

    /// Flush the inner parser. Fails if a partial code point is still buffered.
    pub fn finish(&mut self) -> Result<StreamTextChunk<P::Extracted>, Utf8StreamParserError> {
        if !self.pending_utf8.is_empty() {
            return Err(match std::str::from_utf8(&self.pending_utf8) {
                Err(err) if err.error_len().is_some() => Utf8StreamParserError::InvalidUtf8 {
                    valid_up_to: err.valid_up_to(),
                    error_len: err.error_len().unwrap_or(0),
                },
                _ => Utf8StreamParserError::IncompleteUtf8AtEof,
            });
        }
        Ok(self.inner.finish())
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut P {
        &mut self.inner
    }
}
