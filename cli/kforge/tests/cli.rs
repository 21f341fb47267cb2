use std::fs;
use std::path::Path;

use assert_cmd::Command;

fn kforge(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kforge").unwrap();
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let assert = cmd.assert().success();
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}

#[test]
fn unknown_platform_exits_255_and_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    for action in ["-b", "-r", "-c", "--show-platforms"] {
        let assert = kforge(dir.path())
            .args(["-p", "riscv-sbc", action])
            .assert()
            .code(255);
        let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
        assert!(stderr.contains("unknown platform 'riscv-sbc'"), "{stderr}");
        assert!(stderr.contains("qemu, k210"), "{stderr}");
    }
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn show_platforms_lists_builtins() {
    let dir = tempfile::tempdir().unwrap();
    let out = stdout_of(kforge(dir.path()).arg("--show-platforms"));
    assert!(out.contains("* qemu"), "{out}");
    assert!(out.contains("  k210"), "{out}");
}

#[test]
fn manifest_selects_default_platform() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("kforge.toml"),
        "[project]\ndefault-platform = \"k210\"\n",
    )
    .unwrap();
    let out = stdout_of(kforge(dir.path()).arg("--show-platforms"));
    assert!(out.contains("* k210"), "{out}");
}

#[test]
fn version_prints_version_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("version"), "0.4.2\n").unwrap();
    assert_eq!(stdout_of(kforge(dir.path()).arg("-v")), "0.4.2\n");
}

#[test]
fn missing_version_file_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    kforge(dir.path()).arg("--version").assert().code(1);
}

#[test]
fn run_without_linker_script_refuses_to_boot() {
    let dir = tempfile::tempdir().unwrap();
    let assert = kforge(dir.path()).args(["-p", "qemu", "-r"]).assert().code(255);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("not starting it"), "{stderr}");
    assert!(!dir.path().join("linker.ld").exists());
}

#[test]
fn state_tracks_markers_and_clean_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let out = stdout_of(kforge(dir.path()).arg("--show-state"));
    assert!(out.contains("No platform"), "{out}");

    fs::write(dir.path().join("last-qemu"), r#"{"platform":"qemu","mode":"release"}"#).unwrap();
    fs::write(dir.path().join("dump.txt"), "stale").unwrap();
    let out = stdout_of(kforge(dir.path()).arg("--show-state"));
    assert!(out.contains("last built: qemu (release)"), "{out}");

    kforge(dir.path()).args(["-p", "qemu", "-c"]).assert().success();
    kforge(dir.path()).args(["-p", "qemu", "-c"]).assert().success();
    assert!(!dir.path().join("last-qemu").exists());
    assert!(!dir.path().join("dump.txt").exists());
}

#[test]
fn graph_is_a_warning_only() {
    let dir = tempfile::tempdir().unwrap();
    let assert = kforge(dir.path()).arg("--graph").assert().success();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert!(stderr.contains("--graph"), "{stderr}");
}

#[test]
fn conflicting_actions_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    kforge(dir.path()).args(["-b", "-r"]).assert().code(2);
    kforge(dir.path()).assert().code(2);
}
