//! Process-level checks of the `oc-delta` binary.

use std::fs;

use assert_cmd::Command;
use tempfile::tempdir;

fn oc_delta() -> Command {
    let mut cmd = Command::cargo_bin("oc-delta").expect("oc-delta binary is built");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn no_arguments_prints_usage_and_fails() {
    let output = oc_delta().output().expect("run oc-delta");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn help_lists_both_subcommands() {
    let output = oc_delta().arg("--help").output().expect("run oc-delta");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("signature"));
    assert!(stdout.contains("delta"));
}

#[test]
fn signature_of_empty_file_prints_nothing() {
    let dir = tempdir().expect("tempdir");
    let basis = dir.path().join("empty");
    fs::write(&basis, b"").expect("write basis");

    let output = oc_delta()
        .arg("signature")
        .arg(&basis)
        .output()
        .expect("run oc-delta");
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn signature_lines_carry_truncated_block_count() {
    let dir = tempdir().expect("tempdir");
    let basis = dir.path().join("basis");
    fs::write(&basis, vec![9u8; 1500]).expect("write basis");

    let output = oc_delta()
        .args(["signature", "--checksum", "xxh64"])
        .arg(&basis)
        .output()
        .expect("run oc-delta");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    for (i, line) in lines.iter().enumerate() {
        let fields: Vec<&str> = line.split(' ').collect();
        assert_eq!(fields[0], i.to_string());
        assert_eq!(fields[1].len(), 8);
        assert_eq!(fields[2].len(), 16);
    }
}

#[test]
fn delta_of_identical_files_reuses_every_block() {
    let dir = tempdir().expect("tempdir");
    let basis = dir.path().join("basis");
    let data: Vec<u8> = (0..5000u32).map(|i| (i % 253) as u8).collect();
    fs::write(&basis, &data).expect("write basis");

    let output = oc_delta()
        .arg("delta")
        .arg(&basis)
        .arg(&basis)
        .output()
        .expect("run oc-delta");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 9);
    for (i, line) in lines[..8].iter().enumerate() {
        assert_eq!(*line, format!("{i} reuse {i}"));
    }
    assert_eq!(
        lines[8],
        "total 5000 bytes: 8 blocks reused (5000 bytes), 0 literal bytes"
    );
}

#[test]
fn delta_with_missing_target_exits_with_io_status() {
    let dir = tempdir().expect("tempdir");
    let basis = dir.path().join("basis");
    fs::write(&basis, b"data").expect("write basis");

    let output = oc_delta()
        .arg("delta")
        .arg(&basis)
        .arg(dir.path().join("missing"))
        .output()
        .expect("run oc-delta");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to open"));
}

#[test]
fn delta_past_deadline_exits_with_delta_status() {
    let dir = tempdir().expect("tempdir");
    let basis = dir.path().join("basis");
    fs::write(&basis, b"data").expect("write basis");

    let output = oc_delta()
        .args(["delta", "--timeout", "0"])
        .arg(&basis)
        .arg(&basis)
        .output()
        .expect("run oc-delta");
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("deadline exceeded"));
}
