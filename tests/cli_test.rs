// tests/cli_test.rs
//! Exit status of the testbench binary

use std::fs;
use std::path::Path;
use std::process::Command;

fn testbench(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stream-testbench"));
    cmd.current_dir(dir).env("RUST_LOG", "warn");
    cmd
}

fn write_config(dir: &Path, n_in: usize) {
    let status = testbench(dir)
        .args(["config-gen", "-o", "testbench.toml"])
        .status()
        .unwrap();
    assert!(status.success());

    let text = fs::read_to_string(dir.join("testbench.toml")).unwrap();
    let text = text.replace("n_in = 8", &format!("n_in = {}", n_in));
    fs::write(dir.join("testbench.toml"), text).unwrap();
}

#[test]
fn test_self_test_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let status = testbench(dir.path()).arg("run").status().unwrap();
    assert_eq!(status.code(), Some(0));

    let log = fs::read_to_string(dir.path().join("tb_data/csim_results.log")).unwrap();
    assert_eq!(log.lines().count(), 1);
}

#[test]
fn test_mismatch_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), 2);
    fs::create_dir_all(dir.path().join("tb_data")).unwrap();
    fs::write(dir.path().join("tb_data/tb_input_features.dat"), "1.0 2.5\n").unwrap();
    fs::write(dir.path().join("tb_data/tb_output_predictions.dat"), "1.0 2.0\n").unwrap();

    let output = testbench(dir.path()).args(["run", "--cosim"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("FAILURE"));
    assert!(stdout.contains("Expected: 2.0 Actual: 2.5"));
    assert!(dir.path().join("tb_data/rtl_cosim_results.log").exists());
}

#[test]
fn test_generated_corpus_passes() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), 4);

    let status = testbench(dir.path())
        .args(["gen-corpus", "--rows", "12", "--seed", "3"])
        .status()
        .unwrap();
    assert!(status.success());

    let output = testbench(dir.path())
        .args(["run", "--report", "report.json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap()).unwrap();
    assert_eq!(report["outcome"]["rows"], 12);
    assert_eq!(report["kernel"], "relu");
}

#[test]
fn test_invalid_config_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), 0);
    let status = testbench(dir.path())
        .args(["validate", "-c", "testbench.toml"])
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
}

#[test]
fn test_unbounded_corpus_range_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path(), 4);

    for range in ["inf", "1e308"] {
        let output = testbench(dir.path())
            .args(["gen-corpus", "--rows", "4", "--range", range])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&output.stderr).contains("Corpus range"));
    }
}
