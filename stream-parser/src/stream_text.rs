/// Output of one pushed chunk (or of the final flush).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamTextChunk<T> {
    /// Prose that can be shown right away.
    pub visible_text: String,
    /// Payloads completed by this chunk, in stream order.
    pub extracted: Vec<T>,
}

impl<T> Default for StreamTextChunk<T> {
    fn default() -> Self {
        Self {
            visible_text: String::new(),
            extracted: Vec::new(),
        }
    }
}

impl<T> StreamTextChunk<T> {
    /// Returns true when no visible text or extracted payloads were produced.
    pub fn is_empty(&self) -> bool {
        self.visible_text.is_empty() && self.extracted.is_empty()
    }

    /// Append `other` after `self`.
    pub fn append(&mut self, mut other: StreamTextChunk<T>) {
        self.visible_text.push_str(&other.visible_text);
        self.extracted.append(&mut other.extracted);
    }
}

/// Parsers that consume streamed text deltas and split them into visible text
/// and extracted payloads.
pub trait StreamTextParser {
    /// Payload extracted by this parser (for example a completed edit block).
    type Extracted;

    /// Feed the next delta.
    fn push_str(&mut self, chunk: &str) -> StreamTextChunk<Self::Extracted>;

    /// Flush buffered state at end of stream.
    fn finish(&mut self) -> StreamTextChunk<Self::Extracted>;

    /// Run a complete text through the parser in one go.
    fn push_all(&mut self, text: &str) -> StreamTextChunk<Self::Extracted> {
        let mut out = self.push_str(text);
        out.append(self.finish());
        out
    }
}
