use serde::Serialize;
use serde_json::Value;
use similar::TextDiff;
use tracing::debug;
use tracing::warn;

use crate::ApplyError;
use crate::DiffDirective;
use crate::extract_directives;

/// Result of applying a batch of directives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Updated document content.
    pub content: String,
    /// Number of directives that found their search text.
    pub applied: usize,
    /// Indices (in application order) of directives whose search text was not found.
    pub unmatched: Vec<usize>,
    /// Unified diff between the old and new content. Empty when nothing changed.
    pub unified_diff: String,
}

impl ApplyReport {
    fn unchanged(content: &str) -> Self {
        Self {
            content: content.to_string(),
            applied: 0,
            unmatched: Vec::new(),
            unified_diff: String::new(),
        }
    }

    /// True when there was at least one directive and none of them matched.
    ///
    /// Usually means the model quoted text that drifted from the real document.
    pub fn no_directive_matched(&self) -> bool {
        self.applied == 0 && !self.unmatched.is_empty()
    }
}

/// Apply every SEARCH/REPLACE directive in `instructions` to `original`.
pub fn apply_diff_blocks(original: &str, instructions: &str) -> Result<String, ApplyError> {
    apply_diff_blocks_with_report(original, instructions).map(|report| report.content)
}

/// Like [`apply_diff_blocks`] but also reports which directives matched.
pub fn apply_diff_blocks_with_report(
    original: &str,
    instructions: &str,
) -> Result<ApplyReport, ApplyError> {
    let directives = extract_directives(instructions);
    apply_directives(original, &directives)
}

/// Apply already-extracted directives, in order, each against the content
/// produced by the previous one.
///
/// A JSON object document (by a cheap brace check on the trimmed text) is
/// parsed and edited field by field, then re-serialized compactly. Anything
/// else is edited as plain text.
pub fn apply_directives(
    original: &str,
    directives: &[DiffDirective],
) -> Result<ApplyReport, ApplyError> {
    if directives.is_empty() {
        return Ok(ApplyReport::unchanged(original));
    }

    let report = if looks_like_json_object(original) {
        apply_to_json(original, directives)?
    } else {
        apply_to_text(original, directives)
    };

    if report.no_directive_matched() {
        warn!(
            directives = directives.len(),
            "none of the search/replace directives matched the document"
        );
    }
    Ok(report)
}

fn looks_like_json_object(content: &str) -> bool {
    let trimmed = content.trim();
    trimmed.starts_with('{') && trimmed.ends_with('}')
}

fn apply_to_text(original: &str, directives: &[DiffDirective]) -> ApplyReport {
    let mut content = original.to_string();
    let mut applied = 0;
    let mut unmatched = Vec::new();

    for (idx, directive) in directives.iter().enumerate() {
        if replace_first(&mut content, &directive.search, &directive.replace) {
            applied += 1;
        } else {
            debug!(directive = idx, "search text not found in document");
            unmatched.push(idx);
        }
    }

    let unified_diff = unified_diff(original, &content);
    ApplyReport {
        content,
        applied,
        unmatched,
        unified_diff,
    }
}

fn apply_to_json(original: &str, directives: &[DiffDirective]) -> Result<ApplyReport, ApplyError> {
    let mut document: Value =
        serde_json::from_str(original).map_err(|source| ApplyError::ResultInvalid {
            output: original.to_string(),
            source,
        })?;
    let before = pretty(&document);
    let mut applied = 0;
    let mut unmatched = Vec::new();

    for (idx, directive) in directives.iter().enumerate() {
        let replace = unescape_newlines(&directive.replace);
        if replace_in_string_values(&mut document, &directive.search, &replace) {
            applied += 1;
            continue;
        }
        let unescaped_search = unescape_newlines(&directive.search);
        if unescaped_search != directive.search
            && replace_in_string_values(&mut document, &unescaped_search, &replace)
        {
            applied += 1;
            continue;
        }
        if let Some(updated) = replace_in_serialized(&document, directive)? {
            document = updated;
            applied += 1;
            continue;
        }
        debug!(directive = idx, "search text not found in any document field");
        unmatched.push(idx);
    }

    let content = serialize_verified(&document)?;
    let unified_diff = unified_diff(&before, &pretty(&document));
    Ok(ApplyReport {
        content,
        applied,
        unmatched,
        unified_diff,
    })
}

/// Replace the first occurrence of `search` in the first string value (depth
/// first, document order) that contains it.
fn replace_in_string_values(value: &mut Value, search: &str, replace: &str) -> bool {
    match value {
        Value::String(text) => replace_first(text, search, replace),
        Value::Array(items) => items
            .iter_mut()
            .any(|item| replace_in_string_values(item, search, replace)),
        Value::Object(map) => map
            .values_mut()
            .any(|item| replace_in_string_values(item, search, replace)),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Last resort for search text that spans JSON structure (keys, quotes) or
/// was written against the escaped form: substitute inside the compact
/// serialization and parse the result back.
///
/// Returns `Ok(None)` when the search text does not occur in the serialization.
fn replace_in_serialized(
    document: &Value,
    directive: &DiffDirective,
) -> Result<Option<Value>, ApplyError> {
    let serialized = serialize_verified(document)?;

    let escaped_search = escape_fragment(&directive.search);
    let escaped_replace = escape_fragment(&unescape_newlines(&directive.replace));
    let raw_replace = directive.replace.replace('\n', "\\n");

    let attempt = if !escaped_search.is_empty() && serialized.contains(&escaped_search) {
        serialized.replacen(&escaped_search, &escaped_replace, 1)
    } else if !directive.search.is_empty() && serialized.contains(&directive.search) {
        serialized.replacen(&directive.search, &raw_replace, 1)
    } else {
        return Ok(None);
    };

    match serde_json::from_str::<Value>(&attempt) {
        Ok(value) => Ok(Some(value)),
        Err(source) => Err(ApplyError::ResultInvalid {
            output: attempt,
            source,
        }),
    }
}

/// Serialize compactly and confirm the output parses back before handing it out.
fn serialize_verified(document: &Value) -> Result<String, ApplyError> {
    let output = document.to_string();
    match serde_json::from_str::<Value>(&output) {
        Ok(_) => Ok(output),
        Err(source) => Err(ApplyError::ResultInvalid { output, source }),
    }
}

fn replace_first(haystack: &mut String, search: &str, replace: &str) -> bool {
    if search.is_empty() {
        return false;
    }
    match haystack.find(search) {
        Some(start) => {
            haystack.replace_range(start..start + search.len(), replace);
            true
        }
        None => false,
    }
}

/// Directive text is authored as multi-line prose, but models sometimes copy
/// the escaped `\n` form out of the stored JSON.
fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// JSON string-literal body for `text`, without the surrounding quotes.
fn escape_fragment(text: &str) -> String {
    let quoted = Value::String(text.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

fn pretty(document: &Value) -> String {
    serde_json::to_string_pretty(document).unwrap_or_else(|_| document.to_string())
}

fn unified_diff(before: &str, after: &str) -> String {
    if before == after {
        return String::new();
    }
    TextDiff::from_lines(before, after)
        .unified_diff()
        .context_radius(2)
        .header("original", "updated")
        .to_string()
}
