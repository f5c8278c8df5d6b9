//! CLI integration tests — run the actual ayumi binary.
//! Marked `#[ignore]` to skip in normal `cargo test` (they touch the real
//! journal location).

use std::process::Command;

fn ayumi() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ayumi"))
}

#[test]
#[ignore]
fn test_cli_stats_output() {
    let output = ayumi().arg("stats").output().expect("failed to execute");
    assert!(
        output.status.success(),
        "ayumi stats failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
#[ignore]
fn test_cli_list_json() {
    let output = ayumi()
        .args(["list", "--json"])
        .output()
        .expect("failed to execute");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    // Should be a valid JSON array.
    let _: Vec<serde_json::Value> =
        serde_json::from_str(stdout.trim()).expect("invalid JSON output");
}

#[test]
#[ignore]
fn test_cli_clear_requires_confirm() {
    let output = ayumi().arg("clear").output().expect("failed to execute");
    assert!(
        !output.status.success(),
        "clear without --confirm should fail"
    );
}

#[test]
#[ignore]
fn test_cli_delete_unknown_id_fails() {
    let output = ayumi()
        .args(["delete", "ffffffff"])
        .output()
        .expect("failed to execute");
    assert!(!output.status.success());
}

#[test]
#[ignore]
fn test_cli_import_rejects_non_array() {
    let tmp = std::env::temp_dir().join(format!("ayumi-cli-test-{}", uuid::Uuid::now_v7()));
    std::fs::create_dir_all(&tmp).unwrap();
    let path = tmp.join("bad.json");
    std::fs::write(&path, r#"{"not":"an array"}"#).unwrap();

    let output = ayumi()
        .args(["import", path.to_str().unwrap()])
        .output()
        .expect("failed to execute");
    assert!(!output.status.success(), "non-array import should fail");

    let _ = std::fs::remove_dir_all(&tmp);
}

#[test]
#[ignore]
fn test_cli_add_list_delete_lifecycle() {
    let add = ayumi()
        .args([
            "add",
            "cli lifecycle test episode",
            "--location",
            "park",
            "--category",
            "motor",
            "--support",
            "independent",
        ])
        .output()
        .expect("failed to execute");
    assert!(
        add.status.success(),
        "add failed: {}",
        String::from_utf8_lossy(&add.stderr)
    );

    let list = ayumi()
        .args(["list", "--json"])
        .output()
        .expect("failed to execute");
    let episodes: Vec<serde_json::Value> =
        serde_json::from_str(String::from_utf8_lossy(&list.stdout).trim()).unwrap();
    let ep = episodes
        .iter()
        .find(|e| e["content"] == "cli lifecycle test episode")
        .expect("added episode should appear in list");

    let delete = ayumi()
        .args(["delete", ep["id"].as_str().unwrap()])
        .output()
        .expect("failed to execute");
    assert!(delete.status.success(), "delete failed");
}
