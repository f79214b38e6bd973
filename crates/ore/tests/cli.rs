use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

/// Writes a host snapshot with `nucleus` loaded from `mods/nucleus.jar`
fn write_host(root: &Path) {
    let mods = root.join("mods");
    fs::create_dir_all(&mods).unwrap();
    let source = mods.join("nucleus.jar");
    fs::write(&source, b"nucleus").unwrap();

    let snapshot = format!(
        r#"{{"api_version": "7.5.0", "plugins": [{{"id": "nucleus", "version": "1.0", "source": {:?}}}]}}"#,
        source.to_string_lossy()
    );
    fs::write(root.join("host.json"), snapshot).unwrap();
}

#[test]
fn test_help_lists_commands() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("ore")?;
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("uninstall"))
        .stdout(predicate::str::contains("shell"));

    Ok(())
}

#[test]
fn test_version_flag() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("ore")?;
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));

    Ok(())
}

#[test]
fn test_status_reports_loaded_plugins() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_host(dir.path());

    let mut cmd = Command::cargo_bin("ore")?;
    cmd.arg("--config").arg(dir.path().join("ore.toml")).arg("status");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("nucleus v1.0: installed"))
        .stdout(predicate::str::contains("Pending updates: 0, pending removals: 0"));

    Ok(())
}

#[test]
fn test_uninstall_removes_artifact_when_session_ends() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_host(dir.path());

    let mut cmd = Command::cargo_bin("ore")?;
    cmd.arg("--config")
        .arg(dir.path().join("ore.toml"))
        .args(["uninstall", "nucleus"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("nucleus will be removed"))
        .stdout(predicate::str::contains("Removed 1 plugin(s)."));
    assert!(!dir.path().join("mods").join("nucleus.jar").exists());

    Ok(())
}

#[test]
fn test_uninstall_of_unknown_plugin_fails() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_host(dir.path());

    let mut cmd = Command::cargo_bin("ore")?;
    cmd.arg("--config")
        .arg(dir.path().join("ore.toml"))
        .args(["uninstall", "ghost"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Plugin not installed: ghost"));
    assert!(dir.path().join("mods").join("nucleus.jar").exists());

    Ok(())
}

#[test]
fn test_shell_runs_commands_until_exit() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_host(dir.path());

    let mut cmd = Command::cargo_bin("ore")?;
    cmd.arg("--config")
        .arg(dir.path().join("ore.toml"))
        .arg("shell")
        .write_stdin("status nucleus\nuninstall ghost\nuninstall nucleus\nstatus nucleus\nexit\nstatus\n");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("nucleus: installed"))
        .stdout(predicate::str::contains("nucleus: pending removal"))
        .stderr(predicate::str::contains("Plugin not installed: ghost"))
        .stdout(predicate::str::contains("Removed 1 plugin(s)."))
        .stdout(predicate::str::contains("Pending updates").not());

    Ok(())
}

#[test]
fn test_removal_is_remembered_by_next_session() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    write_host(dir.path());
    let config = dir.path().join("ore.toml");

    Command::cargo_bin("ore")?
        .arg("--config")
        .arg(&config)
        .args(["uninstall", "nucleus"])
        .assert()
        .success();

    let snapshot = fs::read_to_string(dir.path().join("host.json"))?;
    assert!(!snapshot.contains("nucleus"));
    assert!(snapshot.contains("7.5.0"));

    Command::cargo_bin("ore")?
        .arg("--config")
        .arg(&config)
        .args(["status", "nucleus"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nucleus: not installed"));

    Command::cargo_bin("ore")?
        .arg("--config")
        .arg(&config)
        .args(["uninstall", "nucleus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Plugin not installed: nucleus"));

    Ok(())
}
