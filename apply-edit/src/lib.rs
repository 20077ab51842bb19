//! SEARCH/REPLACE directives: extraction, display reduction, and application
//! to a stored document.

mod apply;
mod directive;
mod reduce;

pub use apply::ApplyReport;
pub use apply::apply_diff_blocks;
pub use apply::apply_diff_blocks_with_report;
pub use apply::apply_directives;
pub use directive::DIVIDER_MARKER;
pub use directive::DiffDirective;
pub use directive::DirectiveScan;
pub use directive::PartialDirective;
pub use directive::REPLACE_MARKER;
pub use directive::SEARCH_MARKER;
pub use directive::extract_directives;
pub use directive::scan_directives;
pub use reduce::ReducedDiff;
pub use reduce::reduce;

use docedit_utils_string::preview;
use thiserror::Error;

/// Bytes of attempted output shown in [`ApplyError`]'s `Display`.
pub const ERROR_PREVIEW_BYTES: usize = 512;

#[derive(Debug, Error)]
pub enum ApplyError {
    /// The document looked like a JSON object but the edited (or original)
    /// text does not parse. `output` holds the full attempted text.
    #[error(
        "edited document is not valid JSON ({source}); attempted output: {}",
        preview(.output, ERROR_PREVIEW_BYTES)
    )]
    ResultInvalid {
        output: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApplyError {
    /// The text that failed validation, for debugging or retry prompts.
    pub fn attempted_output(&self) -> &str {
        match self {
            ApplyError::ResultInvalid { output, .. } => output,
        }
    }
}
