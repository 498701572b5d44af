use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::tempdir;

fn cabinet_json(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cabinet-json"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to spawn cabinet-json")
}

fn fixture(name: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

#[test]
fn test_missing_and_extra_arguments_fail() {
    let dir = tempdir().unwrap();
    assert!(!cabinet_json(dir.path(), &[]).status.success());
    assert!(!cabinet_json(dir.path(), &["a.json", "b.json"]).status.success());
}

#[test]
fn test_nonexistent_source_fails_before_running() {
    let dir = tempdir().unwrap();
    let out = cabinet_json(dir.path(), &["missing.json"]);
    assert!(!out.status.success());
    assert!(!dir.path().join("data").exists());
}

#[test]
fn test_success_writes_default_output() {
    let dir = tempdir().unwrap();
    let out = cabinet_json(dir.path(), &[&fixture("csv")]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("Conversion complete: 3 ministers"));

    let written = fs::read_to_string(dir.path().join("data/ministers.json")).unwrap();
    let document: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(document.as_array().map(Vec::len), Some(3));
}

#[test]
fn test_validation_failure_lists_errors_and_writes_nothing() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("gouvernement.json"),
        r#"{"Ministers": [{"id": "m1", "name": "A"}, {"id": "m1", "name": ""}],
            "Delegates": [{"ministerId": "m1", "delegateId": "m7"}]}"#,
    )
    .unwrap();

    let out = cabinet_json(dir.path(), &["gouvernement.json", "--output", "out/ministers.json"]);
    assert!(!out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("ID dupliqué: m1"), "{stdout}");
    assert!(stdout.contains("Ministre m1 sans nom"), "{stdout}");
    assert!(stdout.contains("Delegate m7 inexistant pour m1"), "{stdout}");
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_config_file_and_split_flag() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("cabinet.toml"),
        "[output]\npath = \"public/ministers.json\"\n",
    )
    .unwrap();

    let out = cabinet_json(dir.path(), &[&fixture("workbook.json"), "--split", "public/ministers"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(dir.path().join("public/ministers.json").exists());
    assert!(dir.path().join("public/ministers/index.json").exists());
    assert!(dir.path().join("public/ministers/a-m1.json").exists());
}
