//! Process-level behavior: defaults, exit codes and diagnostics.

mod common;

use common::{read_snapshot, Workspace};

#[test]
fn memory_engine_writes_default_output_name() {
    let workspace = Workspace::create();
    let output = workspace.run(["--engine", "memory"]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let snapshot = read_snapshot(&workspace.path("testhive"));
    assert_eq!(snapshot.root.subkeys.len(), 5);
}

#[test]
fn os_version_is_passed_to_the_engine() {
    let workspace = Workspace::create();
    let output = workspace.run(["--engine", "memory", "--os-version", "10.0", "-o", "hive.json"]);
    assert!(output.status.success());
    let snapshot = read_snapshot(&workspace.path("hive.json"));
    assert_eq!((snapshot.os_version.major, snapshot.os_version.minor), (10, 0));
}

#[test]
fn invalid_arguments_exit_non_zero() {
    let workspace = Workspace::create();
    let output = workspace.run(["--engine", "nonsense"]);
    assert!(!output.status.success());
    assert!(!workspace.path("testhive").exists());
}

#[test]
fn verbose_logs_each_value_to_stderr() {
    let workspace = Workspace::create();
    let output = workspace.run(["--engine", "memory", "--verbose"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("set value"), "{stderr}");
    assert!(stderr.contains("dword-big-endian"), "{stderr}");
    assert!(output.stdout.is_empty());
}

#[cfg(not(windows))]
#[test]
fn missing_offline_registry_library_exits_with_one() {
    let workspace = Workspace::create();
    std::fs::write(workspace.path("testhive"), b"previous").expect("write previous file");

    let output = workspace.run(std::iter::empty::<&str>());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Offline Registry Library"), "{stderr}");
    assert!(stderr.contains("offreg.dll"), "{stderr}");
    // Construction never started, so the previous file is untouched.
    assert_eq!(
        std::fs::read(workspace.path("testhive")).expect("read previous file"),
        b"previous"
    );
}
