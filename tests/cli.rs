//! End-to-end CLI smoke tests against a real binary, database, and
//! pattern directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

struct Workspace {
    _temp: TempDir,
    db: std::path::PathBuf,
    dir: std::path::PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let db = temp.path().join("patterns.db");
        let dir = temp.path().join("patterns");
        let ws = Self { _temp: temp, db, dir };
        ws.cmd().arg("init").assert().success();
        ws
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("psync").unwrap();
        cmd.env("PSYNC_DB", &self.db).env("PSYNC_DIR", &self.dir);
        cmd
    }
}

#[test]
fn test_init_then_reinit_fails_without_force() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("init")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Already initialized"));

    ws.cmd().args(["init", "--force"]).assert().success();
}

#[test]
fn test_commands_require_init() {
    let temp = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("psync").unwrap();
    cmd.env("PSYNC_DB", temp.path().join("missing.db"))
        .env("PSYNC_DIR", temp.path().join("patterns"))
        .arg("list")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("psync init"));
}

#[test]
fn test_upload_export_status_round_trip() {
    let ws = Workspace::new();
    let payload = ws._temp.path().join("upload.json");
    fs::write(
        &payload,
        r#"[{"slug":"hero","title":"Hero","content":"<p>Hi</p>"}]"#,
    )
    .unwrap();

    ws.cmd()
        .args(["upload", payload.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported:    1"));

    // Not yet on disk
    ws.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("missing_from_disk"));

    ws.cmd()
        .args(["sync", "export", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Written:   1"));
    assert!(ws.dir.join("hero.json").exists());

    ws.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("in sync"));
}

#[test]
fn test_trash_and_restore() {
    let ws = Workspace::new();
    let payload = ws._temp.path().join("upload.json");
    fs::write(
        &payload,
        r#"{"slug":"hero","title":"Hero","content":"<p>Hi</p>"}"#,
    )
    .unwrap();
    ws.cmd()
        .args(["upload", payload.to_str().unwrap(), "--write-to-disk"])
        .assert()
        .success();

    ws.cmd().args(["trash", "hero"]).assert().success();
    assert!(!ws.dir.join("hero.json").exists());
    assert!(ws.dir.join("hero.deleted.json").exists());
    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No patterns found"));

    ws.cmd().args(["restore", "hero"]).assert().success();
    assert!(ws.dir.join("hero.json").exists());
    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("hero"));
}

#[test]
fn test_stage_confirm_flow() {
    let ws = Workspace::new();
    let payload = ws._temp.path().join("upload.json");
    fs::write(
        &payload,
        r#"[{"slug":"hero","title":"Hero","content":"<p>Hi</p>"}]"#,
    )
    .unwrap();

    let output = ws
        .cmd()
        .args(["--json", "stage", payload.to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let session_id = parsed["session_id"].as_str().unwrap().to_string();
    assert!(session_id.starts_with("imp_"));

    // Staging touched nothing
    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No patterns found"));

    ws.cmd()
        .args(["confirm", &session_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported:    1"));

    // Sessions are single-use
    ws.cmd()
        .args(["confirm", &session_id])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("session"));
}

#[test]
fn test_pack_round_trips_through_upload() {
    let ws = Workspace::new();
    let payload = ws._temp.path().join("upload.json");
    fs::write(
        &payload,
        r#"[
            {"slug":"a","title":"A","content":"<p>a</p>"},
            {"slug":"b","title":"B","content":"<p>b</p>"}
        ]"#,
    )
    .unwrap();
    ws.cmd()
        .args(["upload", payload.to_str().unwrap()])
        .assert()
        .success();

    let bundle = ws._temp.path().join("bundle.json");
    ws.cmd()
        .args(["pack", bundle.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Packed 2 patterns"));

    // Re-uploading the bundle into a fresh workspace imports everything
    let other = Workspace::new();
    other
        .cmd()
        .args(["--json", "upload", bundle.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"imported\":2"));
}

#[test]
fn test_legacy_upload_keys() {
    let ws = Workspace::new();
    let payload = ws._temp.path().join("legacy.json");
    fs::write(
        &payload,
        r#"[{"post_name":"hero","post_title":"Hero","post_content":"<p>Hi</p>"}]"#,
    )
    .unwrap();

    ws.cmd()
        .args(["upload", payload.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported:    1"));
}

#[test]
fn test_malformed_upload_rejected() {
    let ws = Workspace::new();
    let payload = ws._temp.path().join("bad.json");
    fs::write(&payload, "definitely not json").unwrap();

    ws.cmd()
        .args(["upload", payload.to_str().unwrap()])
        .assert()
        .failure()
        .code(4);
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("psync").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("psync version"));
}
