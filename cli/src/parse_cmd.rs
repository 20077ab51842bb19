use docedit_stream_parser::EditFeed;
use docedit_stream_parser::EditSegment;
use docedit_stream_parser::Segment;
use docedit_stream_parser::feed;

use crate::ParseArgs;
use crate::config::OutputFormat;
use crate::print_json;
use crate::read_input_text;

pub(crate) fn run(args: ParseArgs, format: OutputFormat) -> anyhow::Result<()> {
    let text = read_input_text(args.input.as_deref())?;
    let result = feed(&text, args.is_final)?;

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Human => {
            print!("{}", render_feed(&result));
            Ok(())
        }
    }
}

pub(crate) fn render_feed(result: &EditFeed) -> String {
    let mut out = String::new();
    for segment in &result.segments {
        match segment {
            Segment::Text(_) if segment.is_blank() => {}
            Segment::Text(text) => {
                out.push_str("text:\n");
                push_indented(&mut out, text.trim());
            }
            Segment::Edit(edit) => render_edit(&mut out, edit),
        }
    }
    out.push_str(&format!(
        "completed edits: {}\n",
        result.completed_edits.len()
    ));
    if let Some(open) = result.open_edit() {
        out.push_str(&format!("open edit: <{}> {}\n", open.tag, open.state));
    }
    out
}

fn render_edit(out: &mut String, edit: &EditSegment) {
    out.push_str(&format!("edit <{}> {}\n", edit.tag, edit.state));
    let scan = edit.scan_directives();
    if scan.complete.is_empty() && scan.partial.is_none() {
        push_indented(out, &edit.content);
        return;
    }
    for (idx, directive) in scan.complete.iter().enumerate() {
        let reduced = docedit_apply_edit::reduce(&directive.search, &directive.replace);
        out.push_str(&format!("  directive {}: {reduced}\n", idx + 1));
    }
    if let Some(partial) = scan.partial {
        let stage = if partial.replace.is_some() {
            "replace"
        } else {
            "search"
        };
        out.push_str(&format!("  directive in progress ({stage})\n"));
    }
}

fn push_indented(out: &mut String, text: &str) {
    for line in text.lines() {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }
}
