use std::{fs, path::Path};

use assert_cmd::Command;
use tempfile::TempDir;

fn hookup(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hookup").unwrap();
    cmd.env("HOME", home)
        .env_remove("RUST_LOG")
        .env_remove("HOOKUP_OS_NAME")
        .env_remove("HOOKUP_JOBS")
        .env_remove("HOOKUP_LIFECYCLE_TASKS");
    cmd
}

fn seed_repo() -> TempDir {
    let repo = TempDir::new().unwrap();
    let scripts = repo.path().join("scripts");
    fs::create_dir_all(&scripts).unwrap();
    fs::create_dir_all(repo.path().join(".git").join("hooks")).unwrap();
    fs::write(scripts.join("pre-commit.sh"), "#!/bin/sh\nexit 0\n").unwrap();
    fs::write(scripts.join("commit-msg.sh"), "#!/bin/sh\nexit 0\n").unwrap();
    fs::write(scripts.join("README.md"), "hook docs").unwrap();
    repo
}

fn stdout_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).to_string()
}

fn stderr_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stderr).to_string()
}

#[test]
fn test_platform_reports_override() {
    let home = TempDir::new().unwrap();
    let repo = seed_repo();

    let assert = hookup(home.path())
        .env("HOOKUP_OS_NAME", "Windows 11")
        .args(["platform", "--root"])
        .arg(repo.path())
        .assert()
        .success();

    let stdout = stdout_of(&assert);
    assert!(stdout.contains("Windows 11"));
    assert!(stdout.contains("Classification: other"));
}

#[cfg(unix)]
#[test]
fn test_install_copies_and_marks_executable() {
    use std::os::unix::fs::PermissionsExt;

    let home = TempDir::new().unwrap();
    let repo = seed_repo();

    hookup(home.path())
        .env("HOOKUP_OS_NAME", "Linux")
        .args(["install", "--root"])
        .arg(repo.path())
        .assert()
        .success();

    let hooks = repo.path().join(".git").join("hooks");
    let mut installed: Vec<String> = fs::read_dir(&hooks)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    installed.sort();

    assert_eq!(installed, vec!["commit-msg", "pre-commit"]);

    for name in &installed {
        let mode = fs::metadata(hooks.join(name)).unwrap().permissions().mode();
        assert_ne!(mode & 0o100, 0, "{name} is not executable");
    }
}

#[test]
fn test_install_is_skipped_on_other_platforms() {
    let home = TempDir::new().unwrap();
    let repo = seed_repo();

    let assert = hookup(home.path())
        .env("HOOKUP_OS_NAME", "Windows 10")
        .args(["run", "build", "--root"])
        .arg(repo.path())
        .assert()
        .success();

    assert!(stderr_of(&assert).contains("Unsupported platform"));
    assert!(
        fs::read_dir(repo.path().join(".git").join("hooks"))
            .unwrap()
            .next()
            .is_none()
    );
}

#[test]
fn test_dry_run_changes_nothing() {
    let home = TempDir::new().unwrap();
    let repo = seed_repo();

    hookup(home.path())
        .env("HOOKUP_OS_NAME", "Linux")
        .args(["run", "build", "--dry-run", "--root"])
        .arg(repo.path())
        .assert()
        .success();

    assert!(!repo.path().join(".git").join("hooks").join("pre-commit").exists());
}

#[test]
fn test_tasks_lists_hook_tasks() {
    let home = TempDir::new().unwrap();
    let repo = seed_repo();

    let assert = hookup(home.path())
        .args(["tasks", "--root"])
        .arg(repo.path())
        .assert()
        .success();

    let stdout = stdout_of(&assert);
    assert!(stdout.contains("git hooks tasks"));
    assert!(stdout.contains("installGitHooks"));
    assert!(stdout.contains("(depends on: copyGitHooks)"));
    assert!(stdout.contains("build tasks"));
}

#[test]
fn test_lifecycle_tasks_from_env() {
    let home = TempDir::new().unwrap();
    let repo = seed_repo();

    let assert = hookup(home.path())
        .env("HOOKUP_LIFECYCLE_TASKS", "build,lint")
        .args(["tasks", "--root"])
        .arg(repo.path())
        .assert()
        .success();

    let stdout = stdout_of(&assert);
    assert!(stdout.contains("lint"));
    assert!(!stdout.contains("assembleDebug"));
}

#[test]
fn test_unknown_task_fails() {
    let home = TempDir::new().unwrap();
    let repo = seed_repo();

    let assert = hookup(home.path())
        .args(["run", "deploy", "--root"])
        .arg(repo.path())
        .assert()
        .failure()
        .code(1);

    assert!(stderr_of(&assert).contains("deploy"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let home = TempDir::new().unwrap();
    let repo = seed_repo();

    hookup(home.path())
        .args(["init", "--root"])
        .arg(repo.path())
        .assert()
        .success();

    let config = fs::read_to_string(repo.path().join("hookup.toml")).unwrap();
    assert!(config.contains("scripts_dir = \"scripts\""));

    hookup(home.path())
        .args(["init", "--root"])
        .arg(repo.path())
        .write_stdin("")
        .assert()
        .failure();

    hookup(home.path())
        .args(["init", "--force", "--root"])
        .arg(repo.path())
        .assert()
        .success();
}

#[test]
fn test_project_file_detaches_lifecycle() {
    let home = TempDir::new().unwrap();
    let repo = seed_repo();
    fs::write(
        repo.path().join("hookup.toml"),
        "attach_to_lifecycle = false\n",
    )
    .unwrap();

    hookup(home.path())
        .env("HOOKUP_OS_NAME", "Linux")
        .args(["run", "build", "--root"])
        .arg(repo.path())
        .assert()
        .success();

    assert!(!repo.path().join(".git").join("hooks").join("pre-commit").exists());
}

#[test]
fn test_completion() {
    let home = TempDir::new().unwrap();

    let assert = hookup(home.path())
        .args(["completion", "bash"])
        .assert()
        .success();

    assert!(stdout_of(&assert).contains("hookup"));
}
