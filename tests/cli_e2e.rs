use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn find_binary() -> PathBuf {
    if let Ok(p) = std::env::var("CARGO_BIN_EXE_globus-helper") {
        return PathBuf::from(p);
    }
    PathBuf::from(env!("CARGO_BIN_EXE_globus-helper"))
}

fn command() -> Command {
    let mut cmd = Command::new(find_binary());
    for var in [
        "BASE_PATH",
        "ACTIGRAPHY_HANDLE_ZIP",
        "GLOBUS_LOG_LEVEL",
        "GLOBUS_SOURCE_ENDPOINT",
        "GLOBUS_DEST_ENDPOINT",
        "GLOBUS_SOURCE_PATH",
        "GLOBUS_DEST_PATH",
        "GLOBUS_DRY_RUN",
        "GLOBUS_EXTRA_FLAGS",
        "GLOBUS_CLI",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn legacy_tree(base: &Path) -> PathBuf {
    let src = base.join("ne-dump/Actigraph/S01_Actigraphy/v0/S01 RAW.csv");
    fs::create_dir_all(src.parent().unwrap()).unwrap();
    fs::write(&src, "t,x,y,z\n").unwrap();
    src
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn transfer_without_base_path_fails() {
    let out = command().arg("transfer").output().unwrap();
    assert_eq!(out.status.code(), Some(2), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("BASE_PATH"));
}

#[test]
fn transfer_defaults_to_dry_run() {
    let tmp = tempfile::tempdir().unwrap();
    legacy_tree(tmp.path());

    let out = command().arg("transfer").env("BASE_PATH", tmp.path()).output().unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("Would copy "));
    assert!(lines[0].ends_with("sub-S01_ses-1_accel.csv"));
    assert!(!tmp.path().join("act-int-test").exists());
}

#[test]
fn transfer_apply_copies() {
    let tmp = tempfile::tempdir().unwrap();
    legacy_tree(tmp.path());

    let out = command()
        .args(["transfer", "--apply", "--base-path"])
        .arg(tmp.path())
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).starts_with("Copied "));
    let dest = tmp.path().join("act-int-test/sub-S01/accel/ses-1/sub-S01_ses-1_accel.csv");
    assert_eq!(fs::read_to_string(dest).unwrap(), "t,x,y,z\n");
}

#[test]
fn transfer_json_plan() {
    let tmp = tempfile::tempdir().unwrap();
    let src = legacy_tree(tmp.path());

    let out = command()
        .args(["transfer", "--json", "--base-path"])
        .arg(tmp.path())
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["dry_run"], serde_json::Value::Bool(true));
    let pairs = v["pairs"].as_array().unwrap();
    assert_eq!(pairs.len(), 1);
    assert!(pairs[0]["source"].as_str().unwrap().ends_with(src.file_name().unwrap().to_str().unwrap()));
}

#[test]
fn missing_source_root_exit_code() {
    let tmp = tempfile::tempdir().unwrap();
    let out = command().arg("transfer").env("BASE_PATH", tmp.path()).output().unwrap();
    assert_eq!(out.status.code(), Some(3), "stderr: {}", stderr(&out));
}

#[test]
fn sync_show_command_uses_env() {
    let out = command()
        .args(["sync", "--show-command", "--label", "nightly run"])
        .env("GLOBUS_SOURCE_ENDPOINT", "src-ep")
        .env("GLOBUS_DEST_ENDPOINT", "dst-ep")
        .env("GLOBUS_DEST_PATH", "/archive/act")
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let argv = shlex::split(stdout(&out).trim()).unwrap();
    assert_eq!(
        argv,
        [
            "globus",
            "transfer",
            "--recursive",
            "--sync-level",
            "mtime",
            "--label",
            "nightly run",
            "--notify",
            "on",
            "--preserve-mtime",
            "src-ep:/",
            "dst-ep:/archive/act",
        ]
    );
}

#[test]
fn sync_missing_settings_fails() {
    let out = command().args(["sync", "--show-command"]).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("GLOBUS_SOURCE_ENDPOINT"));
    assert!(err.contains("GLOBUS_DEST_PATH"));
}
