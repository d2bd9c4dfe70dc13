//! Integration tests for the qcp CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.
//! Every test works in its own temporary data directory and points the
//! user config directory at it, so nothing outside the temp dir is read.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to get a qcp command bound to a data directory
fn qcp(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("qcp").unwrap();
    cmd.env("XDG_CONFIG_HOME", tmp.path().join("xdg"))
        .env("HOME", tmp.path())
        .env_remove("QCP_DATA_DIR")
        .env_remove("QCP_BOX_CAPACITY")
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(data_dir(tmp));
    cmd
}

fn data_dir(tmp: &TempDir) -> std::path::PathBuf {
    tmp.path().join("data")
}

/// Register a part and return its id
fn register(tmp: &TempDir, weight: &str, length: &str, color: &str) -> u64 {
    let output = qcp(tmp)
        .args(["--format", "id", "register", "--weight", weight, "--length", length, "--color", color])
        .output()
        .unwrap();
    assert!(output.status.success(), "register failed: {:?}", output);
    String::from_utf8_lossy(&output.stdout).trim().parse().unwrap()
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn report_files(tmp: &TempDir) -> Vec<std::path::PathBuf> {
    let dir = data_dir(tmp).join("reports");
    if !dir.exists() {
        return Vec::new();
    }
    let mut files: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == "txt"))
        .collect();
    files.sort();
    files
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help_displays() {
    Command::cargo_bin("qcp")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("quality control"))
        .stdout(predicate::str::contains("register"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn test_version_displays() {
    Command::cargo_bin("qcp")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("qcp"));
}

#[test]
fn test_unknown_command_fails() {
    Command::cargo_bin("qcp")
        .unwrap()
        .arg("unknown-command")
        .assert()
        .failure();
}

// ============================================================================
// Register Command Tests
// ============================================================================

#[test]
fn test_register_approved_part() {
    let tmp = TempDir::new().unwrap();
    qcp(&tmp)
        .args(["register", "--weight", "100", "--length", "15", "--color", "azul"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Part #1 approved"))
        .stdout(predicate::str::contains("box #1 (1/10)"));

    let open_box = read_json(&data_dir(&tmp).join("boxes").join("box_0001.json"));
    assert_eq!(open_box["number"], 1);
    assert_eq!(open_box["closed"], false);
    assert_eq!(open_box["items"][0]["id"], 1);
    assert_eq!(open_box["items"][0]["color"], "azul");
}

#[test]
fn test_register_normalizes_color_and_accepts_comma_decimal() {
    let tmp = TempDir::new().unwrap();
    qcp(&tmp)
        .args(["register", "--weight", "99,5", "--length", "10", "--color", "  VERDE "])
        .assert()
        .success()
        .stdout(predicate::str::contains("approved"));

    let open_box = read_json(&data_dir(&tmp).join("boxes").join("box_0001.json"));
    assert_eq!(open_box["items"][0]["weight"], 99.5);
    assert_eq!(open_box["items"][0]["color"], "verde");
}

#[test]
fn test_register_rejected_part_lists_every_reason() {
    let tmp = TempDir::new().unwrap();
    qcp(&tmp)
        .args(["register", "--weight", "120", "--length", "25", "--color", "vermelho"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Part #1 rejected"))
        .stdout(predicate::str::contains("weight out of range"))
        .stdout(predicate::str::contains("length out of range"))
        .stdout(predicate::str::contains("color not allowed"));

    let rejected = read_json(&data_dir(&tmp).join("reprovadas.json"));
    let entries = rejected.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["approved"], false);
    assert_eq!(
        entries[0]["failure_reasons"],
        serde_json::json!(["weight_out_of_range", "length_out_of_range", "color_not_allowed"])
    );
}

#[test]
fn test_register_boundaries_are_inclusive() {
    let tmp = TempDir::new().unwrap();
    qcp(&tmp)
        .args(["register", "--weight", "95", "--length", "20", "--color", "azul"])
        .assert()
        .success()
        .stdout(predicate::str::contains("approved"));
    qcp(&tmp)
        .args(["register", "--weight", "105.01", "--length", "20", "--color", "azul"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rejected"));
}

#[test]
fn test_register_non_numeric_weight_fails() {
    let tmp = TempDir::new().unwrap();
    qcp(&tmp)
        .args(["register", "--weight", "heavy", "--length", "15", "--color", "azul"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a number"));

    assert!(!data_dir(&tmp).join("boxes").join("box_0001.json").exists());
}

#[test]
fn test_register_json_output() {
    let tmp = TempDir::new().unwrap();
    let output = qcp(&tmp)
        .args(["--format", "json", "register", "--weight", "100", "--length", "15", "--color", "azul"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let item: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(item["id"], 1);
    assert_eq!(item["approved"], true);
}

// ============================================================================
// Packing Tests
// ============================================================================

#[test]
fn test_ten_approved_parts_close_a_box() {
    let tmp = TempDir::new().unwrap();
    for _ in 0..9 {
        register(&tmp, "100", "15", "azul");
    }

    qcp(&tmp)
        .args(["register", "--weight", "100", "--length", "15", "--color", "azul"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Box #1 is full and has been closed"));

    let boxes = data_dir(&tmp).join("boxes");
    let first = read_json(&boxes.join("box_0001.json"));
    assert_eq!(first["closed"], true);
    assert_eq!(first["items"].as_array().unwrap().len(), 10);

    let second = read_json(&boxes.join("box_0002.json"));
    assert_eq!(second["closed"], false);
    assert!(second["items"].as_array().unwrap().is_empty());

    qcp(&tmp)
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("10 approved, 0 rejected, 1 closed box"))
        .stdout(predicate::str::contains("Report saved to"));

    let reports = report_files(&tmp);
    assert_eq!(reports.len(), 1);
    let name = reports[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("relatorio_"));
    let text = fs::read_to_string(&reports[0]).unwrap();
    assert!(text.contains("Closed boxes: 1"));
    assert!(text.contains("Open box #2: 0/10 parts"));
}

#[test]
fn test_rejected_parts_never_enter_boxes() {
    let tmp = TempDir::new().unwrap();
    register(&tmp, "100", "15", "azul");
    register(&tmp, "50", "15", "azul");
    register(&tmp, "100", "15", "preto");

    let open_box = read_json(&data_dir(&tmp).join("boxes").join("box_0001.json"));
    assert_eq!(open_box["items"].as_array().unwrap().len(), 1);

    let rejected = read_json(&data_dir(&tmp).join("reprovadas.json"));
    assert_eq!(rejected.as_array().unwrap().len(), 2);
}

#[test]
fn test_box_capacity_from_environment() {
    let tmp = TempDir::new().unwrap();
    for _ in 0..2 {
        qcp(&tmp)
            .env("QCP_BOX_CAPACITY", "2")
            .args(["register", "--weight", "100", "--length", "15", "--color", "azul"])
            .assert()
            .success();
    }

    let first = read_json(&data_dir(&tmp).join("boxes").join("box_0001.json"));
    assert_eq!(first["closed"], true);
}

// ============================================================================
// Remove Command Tests
// ============================================================================

#[test]
fn test_remove_from_open_box() {
    let tmp = TempDir::new().unwrap();
    let id = register(&tmp, "100", "15", "azul");

    qcp(&tmp)
        .args(["remove", &id.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed part #1 from the open box"));

    let open_box = read_json(&data_dir(&tmp).join("boxes").join("box_0001.json"));
    assert!(open_box["items"].as_array().unwrap().is_empty());
}

#[test]
fn test_remove_from_rejected_registry() {
    let tmp = TempDir::new().unwrap();
    let id = register(&tmp, "200", "15", "azul");

    qcp(&tmp)
        .args(["remove", &id.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("rejected registry"));

    let rejected = read_json(&data_dir(&tmp).join("reprovadas.json"));
    assert!(rejected.as_array().unwrap().is_empty());
}

#[test]
fn test_remove_from_closed_box_fails() {
    let tmp = TempDir::new().unwrap();
    for _ in 0..10 {
        register(&tmp, "100", "15", "azul");
    }
    let before = fs::read_to_string(data_dir(&tmp).join("boxes").join("box_0001.json")).unwrap();

    qcp(&tmp)
        .args(["remove", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("closed box #1"));

    let after = fs::read_to_string(data_dir(&tmp).join("boxes").join("box_0001.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_remove_unknown_id_fails() {
    let tmp = TempDir::new().unwrap();
    qcp(&tmp)
        .args(["remove", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_next_id_follows_highest_stored_id() {
    let tmp = TempDir::new().unwrap();
    register(&tmp, "100", "15", "azul");
    let second = register(&tmp, "100", "15", "azul");
    qcp(&tmp).args(["remove", &second.to_string()]).assert().success();

    // next id comes from the highest id still on disk
    assert_eq!(register(&tmp, "100", "15", "azul"), 2);
    assert_eq!(register(&tmp, "100", "15", "azul"), 3);
}

// ============================================================================
// List / Boxes Command Tests
// ============================================================================

#[test]
fn test_list_empty() {
    let tmp = TempDir::new().unwrap();
    qcp(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No approved parts"))
        .stdout(predicate::str::contains("No rejected parts"));
}

#[test]
fn test_list_formats() {
    let tmp = TempDir::new().unwrap();
    register(&tmp, "100", "15", "azul");
    register(&tmp, "100", "30", "verde");

    qcp(&tmp)
        .args(["--format", "tsv", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ID\tWeight (g)\tLength (cm)\tColor\tStatus"))
        .stdout(predicate::str::contains("1\t100\t15\tazul\tapproved"));

    qcp(&tmp)
        .args(["--format", "csv", "list", "--rejected"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2,100,30,verde,rejected"))
        .stdout(predicate::str::contains("azul").not());

    qcp(&tmp)
        .args(["--format", "id", "list", "--approved"])
        .assert()
        .success()
        .stdout("1\n");

    let output = qcp(&tmp).args(["--format", "json", "list"]).output().unwrap();
    let lists: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(lists["approved"].as_array().unwrap().len(), 1);
    assert_eq!(lists["rejected"][0]["id"], 2);
}

#[test]
fn test_list_approved_and_rejected_conflict() {
    let tmp = TempDir::new().unwrap();
    qcp(&tmp)
        .args(["list", "--approved", "--rejected"])
        .assert()
        .failure();
}

#[test]
fn test_boxes_lists_closed_boxes() {
    let tmp = TempDir::new().unwrap();
    qcp(&tmp)
        .arg("boxes")
        .assert()
        .success()
        .stdout(predicate::str::contains("No closed boxes"));

    for _ in 0..10 {
        register(&tmp, "100", "15", "azul");
    }

    qcp(&tmp)
        .args(["--format", "tsv", "boxes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1\t10/10\t1, 2, 3, 4, 5, 6, 7, 8, 9, 10"));
}

// ============================================================================
// Persistence Tests
// ============================================================================

#[test]
fn test_state_survives_restart() {
    let tmp = TempDir::new().unwrap();
    for _ in 0..12 {
        register(&tmp, "100", "15", "azul");
    }
    register(&tmp, "80", "15", "azul");

    qcp(&tmp)
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total registered parts: 13"))
        .stdout(predicate::str::contains("12 approved, 1 rejected, 1 closed box"))
        .stdout(predicate::str::contains("Open box #2: 2/10 parts"))
        .stdout(predicate::str::contains("IDs: 11, 12"));
}

#[test]
fn test_corrupt_box_is_skipped_with_warning() {
    let tmp = TempDir::new().unwrap();
    register(&tmp, "100", "15", "azul");
    fs::write(data_dir(&tmp).join("boxes").join("box_0005.json"), "{ not json").unwrap();

    qcp(&tmp)
        .arg("list")
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipped"))
        .stderr(predicate::str::contains("box_0005.json"))
        .stdout(predicate::str::contains("azul"));

    // the corrupt file is left alone
    assert_eq!(
        fs::read_to_string(data_dir(&tmp).join("boxes").join("box_0005.json")).unwrap(),
        "{ not json"
    );
}

#[test]
fn test_report_quiet_prints_nothing() {
    let tmp = TempDir::new().unwrap();
    register(&tmp, "100", "15", "azul");
    qcp(&tmp)
        .args(["--quiet", "report"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert_eq!(report_files(&tmp).len(), 1);
}

#[test]
fn test_box_without_approved_flags_is_skipped_and_kept() {
    let tmp = TempDir::new().unwrap();
    let boxes = data_dir(&tmp).join("boxes");
    fs::create_dir_all(&boxes).unwrap();
    let content = r#"{"number": 1, "closed": false, "items": [
        {"id": 1, "weight": 100, "length": 15, "color": "azul"}
    ]}"#;
    fs::write(boxes.join("box_0001.json"), content).unwrap();

    qcp(&tmp)
        .args(["register", "--weight", "100", "--length", "15", "--color", "azul"])
        .assert()
        .success()
        .stderr(predicate::str::contains("box_0001.json"))
        .stdout(predicate::str::contains("Part #2 approved"))
        .stdout(predicate::str::contains("box #2"));

    assert_eq!(fs::read_to_string(boxes.join("box_0001.json")).unwrap(), content);
}

#[test]
fn test_reports_never_overwrite() {
    let tmp = TempDir::new().unwrap();
    register(&tmp, "100", "15", "azul");
    qcp(&tmp).args(["report", "--no-print"]).assert().success();
    qcp(&tmp).args(["report", "--no-print"]).assert().success();
    assert_eq!(report_files(&tmp).len(), 2);
}

// ============================================================================
// Config Command Tests
// ============================================================================

#[test]
fn test_config_show_defaults() {
    let tmp = TempDir::new().unwrap();
    qcp(&tmp)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("box_capacity"))
        .stdout(predicate::str::contains("azul, verde"));

    qcp(&tmp)
        .args(["config", "show", "max_weight"])
        .assert()
        .success()
        .stdout("105\n");
}

#[test]
fn test_config_set_changes_rules() {
    let tmp = TempDir::new().unwrap();
    qcp(&tmp)
        .args(["config", "set", "allowed_colors", "azul,preto"])
        .assert()
        .success();
    assert!(data_dir(&tmp).join("config.yaml").exists());

    qcp(&tmp)
        .args(["register", "--weight", "100", "--length", "15", "--color", "preto"])
        .assert()
        .success()
        .stdout(predicate::str::contains("approved"));
    qcp(&tmp)
        .args(["register", "--weight", "100", "--length", "15", "--color", "verde"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rejected"));

    qcp(&tmp)
        .args(["config", "unset", "allowed_colors"])
        .assert()
        .success();
    qcp(&tmp)
        .args(["config", "show", "allowed_colors"])
        .assert()
        .success()
        .stdout("azul, verde\n");
}

#[test]
fn test_config_path() {
    let tmp = TempDir::new().unwrap();
    qcp(&tmp)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.yaml"))
        .stdout(predicate::str::contains("not created"));
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    qcp(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("qcp"));
}
