use std::io::Write;

use docedit_stream_parser::EditBlockStreamParser;
use docedit_stream_parser::EditError;
use docedit_stream_parser::EditSegment;
use docedit_stream_parser::ExtractedEdit;
use docedit_stream_parser::StreamTextChunk;
use docedit_stream_parser::Utf8StreamParser;
use serde::Serialize;
use tracing::debug;

use crate::StreamArgs;
use crate::config::OutputFormat;
use crate::read_input;

/// One JSON line of `docedit stream --json` output.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent<'a> {
    Text { text: &'a str },
    Edit { edit: &'a ExtractedEdit },
    Incomplete { edit: &'a EditSegment },
}

pub(crate) fn run(args: StreamArgs, format: OutputFormat) -> anyhow::Result<()> {
    let bytes = read_input(args.input.as_deref())?;
    let mut parser = Utf8StreamParser::new(EditBlockStreamParser::new());
    let mut stdout = std::io::stdout().lock();

    for (idx, chunk) in bytes.chunks(args.chunk_size.get()).enumerate() {
        let out = parser.push_bytes(chunk)?;
        if parser.inner().has_open_block() {
            debug!(chunk = idx, "edit block streaming");
        }
        emit(&mut stdout, &out, format)?;
    }
    let tail = parser.finish()?;
    emit(&mut stdout, &tail, format)?;

    let Some(open) = parser.inner_mut().take_incomplete() else {
        stdout.flush()?;
        return Ok(());
    };
    if format == OutputFormat::Json {
        write_event(&mut stdout, &StreamEvent::Incomplete { edit: &open })?;
    }
    stdout.flush()?;
    Err(EditError::IncompleteEdit {
        tag: open.tag,
        state: open.state,
        partial_content: open.content,
    }
    .into())
}

fn emit(
    stdout: &mut impl Write,
    chunk: &StreamTextChunk<ExtractedEdit>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            if !chunk.visible_text.is_empty() {
                write_event(
                    stdout,
                    &StreamEvent::Text {
                        text: &chunk.visible_text,
                    },
                )?;
            }
            for edit in &chunk.extracted {
                write_event(stdout, &StreamEvent::Edit { edit })?;
            }
        }
        OutputFormat::Human => {
            stdout.write_all(chunk.visible_text.as_bytes())?;
            stdout.flush()?;
            for edit in &chunk.extracted {
                eprintln!(
                    "[edit] <{}> completed ({} bytes, {} directives)",
                    edit.tag,
                    edit.content.len(),
                    edit.directives.len()
                );
            }
        }
    }
    Ok(())
}

fn write_event(stdout: &mut impl Write, event: &StreamEvent<'_>) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *stdout, event)?;
    stdout.write_all(b"\n")?;
    Ok(())
}
