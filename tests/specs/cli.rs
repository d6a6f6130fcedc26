// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Towline Contributors

use assert_cmd::Command;

#[test]
fn version_flag_prints_version() {
    let output = Command::cargo_bin("tow").unwrap().arg("--version").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("tow "));
}

#[test]
fn watch_help_lists_options() {
    let output =
        Command::cargo_bin("tow").unwrap().args(["watch", "--help"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--kind", "--host", "--token", "--interval", "--logs", "--output"] {
        assert!(stdout.contains(flag), "missing {flag} in help output");
    }
}

#[test]
fn watch_requires_job_ids() {
    let output = Command::cargo_bin("tow")
        .unwrap()
        .args(["watch", "--host", "https://awx.example.com", "--token", "t"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
