use std::fs;
use std::path::Path;

use anyhow::Result;
use predicates::str::contains;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;

const RESPONSE: &str = "Sure. <write_to_file><content>\nnew doc\n</content></write_to_file> Done.";

fn docedit_command(home: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(env!("CARGO_BIN_EXE_docedit"));
    cmd.env("DOCEDIT_HOME", home);
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn reduce_prints_word_diff() -> Result<()> {
    let home = TempDir::new()?;
    docedit_command(home.path())
        .args(["reduce", "The quick fox", "The slow fox"])
        .assert()
        .success()
        .stdout("The [-quick-]{+slow+} fox\n");
    Ok(())
}

#[test]
fn reduce_json_exposes_all_parts() -> Result<()> {
    let home = TempDir::new()?;
    let output = docedit_command(home.path())
        .args(["--json", "reduce", "abc", "axc"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: Value = serde_json::from_slice(&output)?;
    assert_eq!(
        value,
        serde_json::json!({
            "common_prefix": "a",
            "search_only": "b",
            "replace_only": "x",
            "common_suffix": "c",
        })
    );
    Ok(())
}

#[test]
fn parse_reports_open_edit_while_streaming() -> Result<()> {
    let home = TempDir::new()?;
    docedit_command(home.path())
        .arg("parse")
        .write_stdin("Hello <write_to_file><content>partial conte")
        .assert()
        .success()
        .stdout(contains("open edit: <write_to_file> CONTENT_STARTED"));
    Ok(())
}

#[test]
fn parse_final_fails_on_unterminated_block() -> Result<()> {
    let home = TempDir::new()?;
    docedit_command(home.path())
        .args(["parse", "--final"])
        .write_stdin("Hello <write_to_file><content>partial conte")
        .assert()
        .failure()
        .stderr(contains("unterminated <write_to_file> block"));
    Ok(())
}

#[test]
fn parse_json_lists_segments_and_completed_edits() -> Result<()> {
    let home = TempDir::new()?;
    let output = docedit_command(home.path())
        .args(["parse", "--final", "--json"])
        .write_stdin(RESPONSE)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: Value = serde_json::from_slice(&output)?;
    assert_eq!(value["has_open_edit"], Value::Bool(false));
    assert_eq!(value["segments"][0]["type"], "text");
    assert_eq!(value["segments"][1]["type"], "edit");
    assert_eq!(value["segments"][1]["segment"]["state"], "COMPLETED");
    assert_eq!(value["completed_edits"][0]["content"], "new doc");
    Ok(())
}

#[test]
fn stream_hides_blocks_from_visible_text() -> Result<()> {
    let home = TempDir::new()?;
    docedit_command(home.path())
        .args(["stream", "--chunk-size", "3"])
        .write_stdin(RESPONSE)
        .assert()
        .success()
        .stdout("Sure.  Done.")
        .stderr(contains("[edit] <write_to_file> completed"));
    Ok(())
}

#[test]
fn stream_json_emits_one_event_per_line() -> Result<()> {
    let home = TempDir::new()?;
    let output = docedit_command(home.path())
        .args(["--json", "stream", "--chunk-size", "6"])
        .write_stdin(RESPONSE)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let events = String::from_utf8(output)?
        .lines()
        .map(serde_json::from_str::<Value>)
        .collect::<Result<Vec<_>, _>>()?;
    let visible: String = events
        .iter()
        .filter(|event| event["type"] == "text")
        .filter_map(|event| event["text"].as_str())
        .collect();
    let edits: Vec<&Value> = events
        .iter()
        .filter(|event| event["type"] == "edit")
        .collect();
    assert_eq!(visible, "Sure.  Done.");
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0]["edit"]["tag"], "write_to_file");
    assert_eq!(events[0]["type"], "text");
    Ok(())
}

#[test]
fn stream_fails_when_input_ends_inside_block() -> Result<()> {
    let home = TempDir::new()?;
    docedit_command(home.path())
        .arg("stream")
        .write_stdin("Intro <document_edit><content>cut o")
        .assert()
        .failure()
        .stdout("Intro ")
        .stderr(contains("unterminated <document_edit> block"));
    Ok(())
}

#[test]
fn apply_instructions_from_stdin_to_stdout() -> Result<()> {
    let home = TempDir::new()?;
    let document = home.path().join("doc.json");
    fs::write(&document, r#"{"a":"line1\nline2"}"#)?;

    docedit_command(home.path())
        .arg("apply")
        .arg("--document")
        .arg(&document)
        .write_stdin("<<<<<<< SEARCH\nline1\n=======\nX\nY\n>>>>>>> REPLACE\n")
        .assert()
        .success()
        .stdout(r#"{"a":"X\nY\nline2"}"#)
        .stderr(contains("applied 1 of 1 directives"));
    Ok(())
}

#[test]
fn apply_reports_invalid_json_result() -> Result<()> {
    let home = TempDir::new()?;
    let document = home.path().join("doc.json");
    let instructions = home.path().join("edit.txt");
    fs::write(&document, r#"{"a":"x"}"#)?;
    fs::write(
        &instructions,
        "<<<<<<< SEARCH\n\"a\":\"x\"\n=======\n\"a\":\n>>>>>>> REPLACE\n",
    )?;

    docedit_command(home.path())
        .arg("apply")
        .arg("--document")
        .arg(&document)
        .arg("--instructions")
        .arg(&instructions)
        .assert()
        .failure()
        .stderr(contains("not valid JSON"))
        .stderr(contains(r#"attempted output: {"a":}"#));
    Ok(())
}

#[test]
fn apply_all_miss_fails_only_when_configured() -> Result<()> {
    let home = TempDir::new()?;
    let document = home.path().join("doc.md");
    fs::write(&document, "hello\n")?;
    let instructions = "<<<<<<< SEARCH\nmissing\n=======\nx\n>>>>>>> REPLACE\n";

    docedit_command(home.path())
        .arg("apply")
        .arg("--document")
        .arg(&document)
        .write_stdin(instructions)
        .assert()
        .success()
        .stdout("hello\n")
        .stderr(contains("directive 1 did not match"));

    fs::write(
        home.path().join("config.toml"),
        "[apply]\nfail_on_no_match = true\n",
    )?;
    docedit_command(home.path())
        .arg("apply")
        .arg("--document")
        .arg(&document)
        .write_stdin(instructions)
        .assert()
        .failure()
        .stderr(contains("none of the 1 directives matched"));
    Ok(())
}

#[test]
fn apply_writes_output_file() -> Result<()> {
    let home = TempDir::new()?;
    let document = home.path().join("doc.md");
    let output = home.path().join("out.md");
    fs::write(&document, "one two\n")?;

    docedit_command(home.path())
        .arg("apply")
        .arg("--document")
        .arg(&document)
        .arg("--output")
        .arg(&output)
        .write_stdin("<<<<<<< SEARCH\ntwo\n=======\nthree\n>>>>>>> REPLACE\n")
        .assert()
        .success()
        .stdout("");

    assert_eq!(fs::read_to_string(&output)?, "one three\n");
    assert_eq!(fs::read_to_string(&document)?, "one two\n");
    Ok(())
}

#[test]
fn explicit_config_sets_output_format() -> Result<()> {
    let home = TempDir::new()?;
    let config = home.path().join("custom.toml");
    fs::write(&config, "[output]\nformat = \"json\"\n")?;

    docedit_command(home.path())
        .arg("--config")
        .arg(&config)
        .args(["reduce", "a", "b"])
        .assert()
        .success()
        .stdout(contains("\"search_only\": \"a\""));
    Ok(())
}

#[test]
fn invalid_config_reports_location() -> Result<()> {
    let home = TempDir::new()?;
    fs::write(home.path().join("config.toml"), "colour = true\n")?;

    docedit_command(home.path())
        .args(["reduce", "a", "b"])
        .assert()
        .failure()
        .stderr(contains("config.toml:1:1"));
    Ok(())
}

#[test]
fn completion_script_names_binary() -> Result<()> {
    let home = TempDir::new()?;
    docedit_command(home.path())
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(contains("docedit"));
    Ok(())
}
