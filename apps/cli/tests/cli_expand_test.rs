//! Integration tests for the `lp expand` command.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

const ARGUMENTS_PY: &str = r"
def _add_training_args(parser):
    group = parser.add_argument_group(title='training')
    group.add_argument('--train-iters', type=int, default=None)
    group.add_argument('--train-samples', type=int, default=None)
    group.add_argument('--lr-decay-iters', type=int, default=None)
    group.add_argument('--lr-decay-samples', type=int, default=None)
    group.add_argument('--lr-wsd-decay-iters', type=int, default=None)
    group.add_argument('--lr-wsd-decay-samples', type=int, default=None)
    group.add_argument('--seq-length', type=int, default=None)
    group.add_argument('--global-batch-size', type=int, default=None)
    group.add_argument('--lr', type=float, default=None)
    group.add_argument('--bf16', action='store_true')
";

/// Fake Megatron-LM checkout with a minimal arguments file.
fn megatron_root(temp_dir: &TempDir) -> std::path::PathBuf {
    let root = temp_dir.path().join("Megatron-LM");
    let dir = root.join("megatron").join("training");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("arguments.py"), ARGUMENTS_PY).unwrap();
    root
}

fn write_document(temp_dir: &TempDir, megatron_args: &str) -> std::path::PathBuf {
    let path = temp_dir.path().join("launch.yaml");
    let content = format!(
        "sbatch_args:\n  job_name: gpt\n  out_dir: {}\n  time: \"00:30:00\"\n  account: proj\n  nodes: 1\n  partition: gpu\nmegatron_args:\n{megatron_args}sweep_args: [lr]\n",
        temp_dir.path().join("out").display()
    );
    std::fs::write(&path, content).unwrap();
    path
}

fn lp(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("launchpad-cli").unwrap();
    cmd.current_dir(temp_dir.path()).env("HOME", temp_dir.path()).env_remove("MEGATRON_PATH");
    cmd
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

const SWEEP: &str = "  seq_length: 2048\n  global_batch_size: 4\n  train_tokens: \"1_000_000\"\n  lr_decay_fraction: 0.5\n  lr: [0.01, 0.001]\n  bf16: true\n";

#[test]
fn test_expand_json_lists_jobs() {
    let temp_dir = TempDir::new().unwrap();
    let root = megatron_root(&temp_dir);
    let doc = write_document(&temp_dir, SWEEP);

    let assert = lp(&temp_dir)
        .args(["expand", arg(&doc), "--megatron-path", arg(&root), "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("expand JSON output should be valid JSON");
    let jobs = json.as_array().expect("manifest is an array");
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0]["job_name"], "gpt_lr0_01");
    assert_eq!(jobs[1]["job_name"], "gpt_lr0_001");
    let flags: Vec<&str> = jobs[0]["flags"].as_array().unwrap().iter().map(|f| f.as_str().unwrap()).collect();
    assert!(flags.contains(&"--train-iters 123"));
    assert!(flags.contains(&"--lr-decay-iters 61"));
    assert!(flags.contains(&"--bf16"));

    // Preview only: nothing is written.
    assert!(!temp_dir.path().join("out").exists());
}

#[test]
fn test_expand_human_output() {
    let temp_dir = TempDir::new().unwrap();
    let root = megatron_root(&temp_dir);
    let doc = write_document(&temp_dir, SWEEP);

    lp(&temp_dir)
        .args(["expand", arg(&doc), "--megatron-path", arg(&root)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sweep (2 jobs)"))
        .stdout(predicate::str::contains("gpt_lr0_001"));
}

#[test]
fn test_expand_uses_megatron_path_env() {
    let temp_dir = TempDir::new().unwrap();
    let root = megatron_root(&temp_dir);
    let doc = write_document(&temp_dir, SWEEP);

    lp(&temp_dir).env("MEGATRON_PATH", arg(&root)).args(["expand", arg(&doc), "--json"]).assert().success();
}

#[test]
fn test_expand_reports_every_unknown_argument() {
    let temp_dir = TempDir::new().unwrap();
    let root = megatron_root(&temp_dir);
    let doc = write_document(&temp_dir, &format!("{SWEEP}  learning_rate: 0.1\n  use_magic: true\n"));

    lp(&temp_dir)
        .args(["expand", arg(&doc), "--megatron-path", arg(&root)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown training arguments: learning_rate, use_magic"));
}

#[test]
fn test_expand_reports_conflicting_lengths() {
    let temp_dir = TempDir::new().unwrap();
    let root = megatron_root(&temp_dir);
    let doc = write_document(&temp_dir, "  train_iters: 10\n  train_samples: 10\n  lr: 0.1\n");

    lp(&temp_dir)
        .args(["expand", arg(&doc), "--megatron-path", arg(&root)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("training length"))
        .stderr(predicate::str::contains("decay length"));
}

#[test]
fn test_expand_without_megatron_path() {
    let temp_dir = TempDir::new().unwrap();
    let doc = write_document(&temp_dir, SWEEP);

    lp(&temp_dir)
        .args(["expand", arg(&doc)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Megatron-LM location unknown"));
}

#[test]
fn test_expand_missing_document() {
    let temp_dir = TempDir::new().unwrap();
    let root = megatron_root(&temp_dir);

    lp(&temp_dir)
        .args(["expand", "does-not-exist.yaml", "--megatron-path", arg(&root)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load launch document"));
}
