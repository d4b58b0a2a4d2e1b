//! Integration tests for the `lp launch` command.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ARGUMENTS_PY: &str = r"
    group.add_argument('--train-iters', type=int, default=None)
    group.add_argument('--lr-decay-iters', type=int, default=None)
    group.add_argument('--lr-wsd-decay-iters', type=int, default=None)
    group.add_argument('--lr', type=float, default=None)
    group.add_argument('--seed', type=int, default=1234)
    group.add_argument('--save', type=str, default=None)
";

fn megatron_root(temp_dir: &TempDir) -> PathBuf {
    let root = temp_dir.path().join("Megatron-LM");
    let dir = root.join("megatron").join("training");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("arguments.py"), ARGUMENTS_PY).unwrap();
    root
}

fn out_dir(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("runs").join("gpt")
}

fn write_document(temp_dir: &TempDir, extra_args: &str) -> PathBuf {
    let path = temp_dir.path().join("launch.yaml");
    let content = format!(
        r#"sbatch_args:
  job_name: gpt
  out_dir: {}
  time: "00:30:00"
  account: proj
  nodes: 2
  partition: gpu
megatron_args:
  train_iters: 100
  lr_decay_iters: 90
  lr: [0.01, 0.001]
  seed: 7
  save: /ckpt/gpt
{extra_args}sweep_args:
  - lr
"#,
        out_dir(temp_dir).display()
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

#[test]
fn test_launch_dry_run_writes_artifacts() {
    let temp_dir = TempDir::new().unwrap();
    let root = megatron_root(&temp_dir);
    let doc = write_document(&temp_dir, "");

    lp(&temp_dir)
        .args(["launch", arg(&doc), "--megatron-path", arg(&root), "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Launch prepared (2 jobs)"))
        .stdout(predicate::str::contains("sbatch --array=0-1"))
        .stdout(predicate::str::contains("Dry run: job array not submitted."));

    let out = out_dir(&temp_dir);
    assert!(out.join("slurm_logs").is_dir(), "slurm_logs directory should exist");
    let script = std::fs::read_to_string(out.join("slurm_scripts").join("gpt.sbatch")).unwrap();
    assert!(script.contains("#SBATCH --nodes=2"));
    assert!(script.contains(&format!("SWEEP_PATH=\"{}\"", out.join("sweep.json").display())));
    assert!(script.contains("SAVE_DIR=\"/ckpt/gpt\""));

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("sweep.json")).unwrap()).unwrap();
    assert_eq!(manifest[0]["job_name"], "gpt_lr0_01");
    assert_eq!(manifest[1]["flags"][1], "--lr-decay-iters 90");
}

#[test]
fn test_launch_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let root = megatron_root(&temp_dir);
    let doc = write_document(&temp_dir, "");

    let assert = lp(&temp_dir)
        .args(["launch", arg(&doc), "--megatron-path", arg(&root), "--dry-run", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("launch JSON output should be valid JSON");
    assert_eq!(json["jobs"], 2);
    assert_eq!(json["array"], "0-1");
    assert_eq!(json["submitted"], false);
    assert_eq!(json["command"][0], "sbatch");
}

#[test]
fn test_launch_custom_template_and_setup_script() {
    let temp_dir = TempDir::new().unwrap();
    let root = megatron_root(&temp_dir);
    let doc = write_document(&temp_dir, "");
    let template = temp_dir.path().join("custom.sbatch");
    std::fs::write(&template, "#!/bin/bash\n# ${job_name} x ${num_jobs}\nsource ${cluster_setup_script}\n").unwrap();

    lp(&temp_dir)
        .args(["launch", arg(&doc), "--megatron-path", arg(&root), "--dry-run"])
        .args(["--template", arg(&template), "--setup-script", "/opt/setup_lumi.sh"])
        .assert()
        .success();

    let script = std::fs::read_to_string(out_dir(&temp_dir).join("slurm_scripts").join("gpt.sbatch")).unwrap();
    assert_eq!(script, "#!/bin/bash\n# gpt x 2\nsource /opt/setup_lumi.sh\n");
}

#[cfg(unix)]
#[test]
fn test_launch_submits_with_program() {
    let temp_dir = TempDir::new().unwrap();
    let root = megatron_root(&temp_dir);
    let doc = write_document(&temp_dir, "");

    lp(&temp_dir)
        .args(["launch", arg(&doc), "--megatron-path", arg(&root), "--submit-program", "echo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Submitted job array"))
        .stdout(predicate::str::contains("--array=0-1"));
}

#[cfg(unix)]
#[test]
fn test_launch_submission_failure() {
    let temp_dir = TempDir::new().unwrap();
    let root = megatron_root(&temp_dir);
    let doc = write_document(&temp_dir, "");

    lp(&temp_dir)
        .args(["launch", arg(&doc), "--megatron-path", arg(&root), "--submit-program", "false"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to submit job array"));
}

#[test]
fn test_launch_invalid_document_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let root = megatron_root(&temp_dir);
    let doc = write_document(&temp_dir, "  train_samples: 1000\n");

    lp(&temp_dir)
        .args(["launch", arg(&doc), "--megatron-path", arg(&root), "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("train_samples"));

    assert!(!out_dir(&temp_dir).exists(), "no artifacts should be written for a failing launch");
}

#[test]
fn test_launch_reads_local_config() {
    let temp_dir = TempDir::new().unwrap();
    let root = megatron_root(&temp_dir);
    let doc = write_document(&temp_dir, "");
    std::fs::write(
        temp_dir.path().join(".launchpadrc"),
        format!("megatron_path = \"{}\"\nsubmit_program = \"qsub-array\"\n", root.display()),
    )
    .unwrap();

    lp(&temp_dir)
        .args(["launch", arg(&doc), "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("qsub-array --array=0-1"));
}
