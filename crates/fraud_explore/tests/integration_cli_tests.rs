use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;

const DATASET: &str = "step,type,amount,nameOrig,nameDest,isFraud,isFlaggedFraud\n\
                       1,PAYMENT,9839.64,C1231006815,M1979787155,0,0\n\
                       1,TRANSFER,181.0,C1305486145,C553264065,1,0\n\
                       1,CASH_OUT,181.0,C840083671,,1,0\n\
                       1,PAYMENT,11668.14,C1231006815,M1979787155,0,0\n";

const EXPECTED_REPORT: &str = "Start analysing\n\
                               Total fraudulent transactions:  2\n\
                               Total unique Customers 3\n\
                               Total unique Recipients include Null:  3\n";

const TREE_MODEL: &str = r#"{
    "feature_names": ["amount", "newbalanceOrig"],
    "class_names": ["legit", "fraud"],
    "children_left": [1, -1, -1],
    "children_right": [2, -1, -1],
    "feature": [1, -2, -2],
    "threshold": [0.5, -2.0, -2.0],
    "impurity": [0.5, 0.1, 0.2],
    "n_node_samples": [100, 40, 60],
    "value": [[50.0, 50.0], [4.0, 36.0], [46.0, 14.0]]
}"#;

fn explore_data() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_explore_data"));
    command.env_remove("FRAUD_CSV");
    command
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("fixture should be written");
    path.to_string_lossy().into_owned()
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn summary_prints_header_then_three_lines() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let input = write_file(&dir, "transactions.csv", DATASET);

    let output = explore_data()
        .args(["summary", "--input", input.as_str()])
        .output()
        .expect("binary should run");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), EXPECTED_REPORT);
}

#[test]
fn missing_column_exits_non_zero_without_partial_stdout() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let input = write_file(&dir, "no_flag.csv", "nameOrig,nameDest\nA,X\n");

    let output = explore_data()
        .args(["summary", "--input", input.as_str()])
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_of(&output).is_empty());
    let stderr = stderr_of(&output);
    assert!(stderr.contains("failed to read transaction dataset"), "{stderr}");
    assert!(!stderr.contains("Deserialize {"), "{stderr}");
}

#[test]
fn missing_file_reports_display_message() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let input = dir.path().join("absent.csv");

    let output = explore_data()
        .args(["summary", "--input"])
        .arg(&input)
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_of(&output).is_empty());
    assert!(stderr_of(&output).contains("failed to open transaction dataset"));
}

#[test]
fn no_subcommand_reads_default_file_in_working_directory() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    write_file(&dir, "Fraud.csv", DATASET);

    let output = explore_data()
        .current_dir(dir.path())
        .output()
        .expect("binary should run");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), EXPECTED_REPORT);
}

#[test]
fn no_subcommand_accepts_input_flag() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let input = write_file(&dir, "semicolons.csv", &DATASET.replace(',', ";"));

    let output = explore_data()
        .args(["--input", input.as_str(), "--delimiter", ";"])
        .output()
        .expect("binary should run");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), EXPECTED_REPORT);
}

#[test]
fn fraud_csv_env_var_overrides_default_path() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let input = write_file(&dir, "from_env.csv", DATASET);
    let empty_dir = tempfile::tempdir().expect("temp dir should be created");

    let output = explore_data()
        .current_dir(empty_dir.path())
        .env("FRAUD_CSV", &input)
        .output()
        .expect("binary should run");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), EXPECTED_REPORT);
}

#[test]
fn tree_writes_dot_and_prints_predicted_class() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let model = write_file(&dir, "tree.json", TREE_MODEL);
    let dot_path = dir.path().join("tree.dot");

    let output = explore_data()
        .args(["tree", "--model", model.as_str(), "--sample", "9000,0", "--output"])
        .arg(&dot_path)
        .output()
        .expect("binary should run");

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), "predicted class: fraud\n");

    let dot = fs::read_to_string(&dot_path).expect("dot file should exist");
    assert!(dot.starts_with("digraph Tree {"));
    assert!(dot.contains("newbalanceOrig <= 0.5"));
}

#[test]
fn tree_with_wrong_sample_width_fails_before_writing() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let model = write_file(&dir, "tree.json", TREE_MODEL);
    let dot_path = dir.path().join("tree.dot");

    let output = explore_data()
        .args(["tree", "--model", model.as_str(), "--sample", "1,2,3", "--output"])
        .arg(&dot_path)
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("sample has 3 features"));
    assert!(!dot_path.exists());
}
