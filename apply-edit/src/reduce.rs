use std::fmt;

use docedit_utils_string::common_prefix_len;
use docedit_utils_string::common_suffix_len;
use serde::Serialize;

/// Display-only view of a directive with the shared prefix and suffix split off.
///
/// `common_prefix + search_only + common_suffix` always equals the search
/// text, and `common_prefix + replace_only + common_suffix` the replacement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReducedDiff {
    pub common_prefix: String,
    pub search_only: String,
    pub replace_only: String,
    pub common_suffix: String,
}

impl ReducedDiff {
    /// True when the directive does not change anything.
    pub fn is_unchanged(&self) -> bool {
        self.search_only.is_empty() && self.replace_only.is_empty()
    }
}

/// Renders in word-diff style: `prefix[-removed-]{+added+}suffix`.
impl fmt::Display for ReducedDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.common_prefix)?;
        if !self.search_only.is_empty() {
            write!(f, "[-{}-]", self.search_only)?;
        }
        if !self.replace_only.is_empty() {
            write!(f, "{{+{}+}}", self.replace_only)?;
        }
        f.write_str(&self.common_suffix)
    }
}

/// Strip the longest common prefix and suffix from `search` and `replace`.
///
/// The suffix scan only looks at what is left after the prefix, capped at the
/// shorter remainder, so the two regions never overlap.
pub fn reduce(search: &str, replace: &str) -> ReducedDiff {
    let prefix = common_prefix_len(search, replace);
    let search_rest = &search[prefix..];
    let replace_rest = &replace[prefix..];
    let cap = search_rest.len().min(replace_rest.len());
    let suffix = common_suffix_len(search_rest, replace_rest, cap);

    ReducedDiff {
        common_prefix: search[..prefix].to_string(),
        search_only: search_rest[..search_rest.len() - suffix].to_string(),
        replace_only: replace_rest[..replace_rest.len() - suffix].to_string(),
        common_suffix: search_rest[search_rest.len() - suffix..].to_string(),
    }
}
