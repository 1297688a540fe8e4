// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use clap::Parser;
use tempfile::TempDir;

fn exec(dir: &TempDir, args: &[&str]) -> Result<String> {
    let mut argv = vec!["gsq", "--state-dir", dir.path().to_str().unwrap()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    let mut out = Vec::new();
    run_with(cli, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn enqueued_write_persists_between_invocations() {
    let dir = TempDir::new().unwrap();
    let id = exec(
        &dir,
        &["enqueue", "students", "update", r#"{"id": "s1", "name": "Ani"}"#],
    )
    .unwrap();

    let listed = exec(&dir, &["list"]).unwrap();
    assert!(listed.contains(id.trim()));
    assert!(dir.path().join("gurusync.db").exists());
}

#[test]
fn config_commands_do_not_open_the_store() {
    let dir = TempDir::new().unwrap();
    exec(&dir, &["config", "show"]).unwrap();
    assert!(!dir.path().join("gurusync.db").exists());
}

#[test]
fn locked_state_dir_is_refused() {
    let dir = TempDir::new().unwrap();
    let _held = gs_sync::StateLock::acquire(dir.path()).unwrap();

    let err = exec(&dir, &["status"]).unwrap_err();
    assert!(err.to_string().contains("in use by another process"));
}
