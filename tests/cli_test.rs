//! Tests running the paramsync binary.

use std::fs;
use std::net::TcpListener;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_paramsync"));
    cmd.env_remove("PARAMSYNC_DIR")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_manifest_listing() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("b"), "hello").unwrap();
    fs::write(dir.path().join("a"), "").unwrap();

    let output = bin()
        .args(["manifest", "--dir"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "manifest failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "a\te3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855\t0",
            "b\t2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824\t5",
        ]
    );
}

#[test]
fn test_manifest_json() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("f"), "hello").unwrap();

    let output = bin()
        .env("PARAMSYNC_DIR", dir.path())
        .args(["manifest", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let files: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(files[0]["name"], "f");
    assert_eq!(files[0]["size"], 5);
    assert_eq!(
        files[0]["hash"],
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
}

#[test]
fn test_missing_dir_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let output = bin()
        .args(["manifest", "--dir"])
        .arg(dir.path().join("missing"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing"));
}

#[test]
fn test_send_without_receiver_fails() {
    let dir = TempDir::new().unwrap();
    let addr = {
        let l = TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().to_string()
    };

    let output = bin()
        .args(["send", &addr, "--no-progress", "--dir"])
        .arg(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to connect"));
}

#[test]
fn test_send_and_recv_processes() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    fs::write(src.path().join("v28.params"), vec![42u8; 4096]).unwrap();

    let addr = {
        let l = TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().to_string()
    };

    let mut recv = bin()
        .args(["recv", &addr, "--no-progress", "--dir"])
        .arg(dest.path())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // Retry until the receiver is listening
    let mut sent = None;
    for _ in 0..50 {
        let output = bin()
            .args(["send", &addr, "--no-progress", "--dir"])
            .arg(src.path())
            .output()
            .unwrap();
        if output.status.success() {
            sent = Some(output);
            break;
        }
        thread::sleep(Duration::from_millis(100));
    }

    let sent = sent.expect("sender never connected");
    assert!(String::from_utf8_lossy(&sent.stdout).contains("files being offered:"));
    assert!(recv.wait().unwrap().success());
    assert_eq!(
        fs::read(dest.path().join("v28.params")).unwrap(),
        vec![42u8; 4096]
    );
}
