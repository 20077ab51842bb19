use anyhow::Context;
use anyhow::bail;
use docedit_apply_edit::ApplyError;
use docedit_apply_edit::ApplyReport;
use docedit_apply_edit::DiffDirective;
use docedit_apply_edit::apply_directives;
use docedit_apply_edit::extract_directives;
use docedit_stream_parser::EditBlockKind;
use docedit_stream_parser::feed;
use docedit_utils_string::preview;
use tracing::info;

use crate::ApplyArgs;
use crate::config::Config;
use crate::config::OutputFormat;
use crate::print_json;
use crate::read_input_text;

pub(crate) fn run(args: ApplyArgs, format: OutputFormat, config: &Config) -> anyhow::Result<()> {
    let document = std::fs::read_to_string(&args.document)
        .with_context(|| format!("failed to read {}", args.document.display()))?;
    let directives = match &args.response {
        Some(response) => directives_from_response(&read_input_text(Some(response.as_path()))?)?,
        None => extract_directives(&read_input_text(args.instructions.as_deref())?),
    };

    let report = match apply_directives(&document, &directives) {
        Ok(report) => report,
        Err(ApplyError::ResultInvalid { output, source }) => bail!(
            "edited document is not valid JSON: {source}\nattempted output: {}",
            preview(&output, config.apply.max_error_preview_bytes)
        ),
    };

    if let Some(output) = &args.output {
        std::fs::write(output, &report.content)
            .with_context(|| format!("failed to write {}", output.display()))?;
    }

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Human => {
            if args.output.is_none() {
                print!("{}", report.content);
            }
            eprint!("{}", summarize(&report, directives.len()));
        }
    }

    if config.apply.fail_on_no_match && report.no_directive_matched() {
        bail!("none of the {} directives matched the document", directives.len());
    }
    Ok(())
}

/// Directives from every completed `<replace_in_file>` block, in order.
fn directives_from_response(response: &str) -> anyhow::Result<Vec<DiffDirective>> {
    let result = feed(response, true)?;
    let mut directives = Vec::new();
    for edit in &result.completed_edits {
        match edit.kind {
            EditBlockKind::SearchReplace => directives.extend(edit.diff_directives()),
            EditBlockKind::FullDocument => {
                info!(tag = %edit.tag, "skipping full-rewrite block");
            }
        }
    }
    Ok(directives)
}

fn summarize(report: &ApplyReport, total: usize) -> String {
    let mut out = format!("applied {} of {total} directives\n", report.applied);
    for idx in &report.unmatched {
        out.push_str(&format!("directive {} did not match\n", idx + 1));
    }
    out.push_str(&report.unified_diff);
    out
}
