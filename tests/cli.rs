//! CLI smoke tests.

use assert_cmd::Command;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

fn hearth(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hearth").unwrap();
    cmd.env_remove("HEARTH_USER")
        .env_remove("HEARTH_TEST_DB")
        .env_remove("RUST_LOG")
        .arg("--db")
        .arg(db)
        .arg("--json")
        .arg("--quiet");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

const PAYLOAD: &str = r#"{
  "users": [{"uid": "u1", "name": "Ada"}, {"uid": "u2", "name": "Grace"}],
  "recipes": [{"uid": "r1", "title": "Soup", "details": "d", "ownerId": "u1"}],
  "meals": [{"uid": "m1", "scalingFactor": 1.0, "mealType": "dinner", "ownerId": "u1", "recipeId": "r1"}]
}"#;

#[test]
fn test_version() {
    let temp_dir = TempDir::new().unwrap();
    let json = stdout_json(hearth(&temp_dir.path().join("hearth.db")).arg("version"));
    assert!(json["version"].is_string());
}

#[test]
fn test_ingest_twice_then_status() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("hearth.db");
    let payload = temp_dir.path().join("payload.json");
    std::fs::write(&payload, PAYLOAD).unwrap();

    let first = stdout_json(hearth(&db).arg("ingest").arg(&payload));
    assert_eq!(first["success"], true);
    assert!(first["report"]["saved"]["upserted"].as_u64().unwrap() >= 4);

    let second = stdout_json(hearth(&db).arg("ingest").arg(&payload));
    assert_eq!(second["report"]["saved"]["upserted"], 0);

    let status = stdout_json(hearth(&db).arg("status"));
    assert_eq!(status["total_dirty"], 0);
}

#[test]
fn test_space_sharing_and_export() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("hearth.db");
    let payload = temp_dir.path().join("payload.json");
    let outbox = temp_dir.path().join("outbox.json");
    std::fs::write(&payload, PAYLOAD).unwrap();
    hearth(&db).arg("ingest").arg(&payload).assert().success();

    let created = hearth(&db)
        .args(["--silent", "--user", "u1", "space", "create", "Kitchen"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let space_id = String::from_utf8(created).unwrap().trim().to_string();
    assert!(!space_id.is_empty());

    hearth(&db)
        .args(["space", "add-member", &space_id, "u2"])
        .assert()
        .success();
    let policy = stdout_json(hearth(&db).args(["space", "policy", &space_id, "recipes"]));
    assert_eq!(policy["reshare"]["changed"], 1);

    let export = stdout_json(hearth(&db).arg("export").arg("--output").arg(&outbox));
    assert_eq!(export["stats"]["recipes"], 1);
    let written: Value = serde_json::from_str(&std::fs::read_to_string(&outbox).unwrap()).unwrap();
    assert_eq!(written["recipes"][0]["uid"], "r1");
}

#[test]
fn test_unknown_space_is_structured_error() {
    let temp_dir = TempDir::new().unwrap();
    let output = hearth(&temp_dir.path().join("hearth.db"))
        .args(["space", "remove-member", "nope", "u1"])
        .assert()
        .code(3)
        .get_output()
        .stderr
        .clone();
    let json: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["error"]["code"], "SPACE_NOT_FOUND");
}

#[test]
fn test_invalid_payload_exit_code() {
    let temp_dir = TempDir::new().unwrap();
    let payload = temp_dir.path().join("bad.json");
    std::fs::write(&payload, "[1, 2, 3]").unwrap();
    hearth(&temp_dir.path().join("hearth.db"))
        .arg("ingest")
        .arg(&payload)
        .assert()
        .code(4);
}
