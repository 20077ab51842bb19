use assert_cmd::Command;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn test_apply_response_scenarios() -> anyhow::Result<()> {
    let mut ran = 0;
    for scenario in fs::read_dir("tests/fixtures/scenarios")? {
        let path = scenario?.path();
        if path.is_dir() {
            run_apply_scenario(&path)?;
            ran += 1;
        }
    }
    assert!(ran > 0, "no scenarios found");
    Ok(())
}

/// Each scenario holds a `document`, a model `response.txt`, and the
/// `expected` document after applying the response's diff blocks.
fn run_apply_scenario(dir: &Path) -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let document = tmp.path().join("document");
    let output = tmp.path().join("output");
    fs::copy(dir.join("document"), &document)?;

    // Exit status is not asserted; scenarios are specified by the output file.
    Command::new(env!("CARGO_BIN_EXE_docedit"))
        .env("DOCEDIT_HOME", tmp.path())
        .arg("apply")
        .arg("--document")
        .arg(&document)
        .arg("--response")
        .arg(dir.join("response.txt"))
        .arg("--output")
        .arg(&output)
        .output()?;

    let expected = fs::read_to_string(dir.join("expected"))?;
    let actual = fs::read_to_string(&output)?;
    assert_eq!(
        actual,
        expected,
        "Scenario {} did not match expected output",
        dir.display()
    );
    // The input document is never modified in place.
    assert_eq!(
        fs::read_to_string(&document)?,
        fs::read_to_string(dir.join("document"))?
    );

    Ok(())
}
