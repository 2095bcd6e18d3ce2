#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

pub fn new_command_with_temp_home() -> (Command, tempfile::TempDir) {
    let temp_home = tempfile::tempdir().expect("temp home");
    let command = command_in(temp_home.path());
    (command, temp_home)
}

/// A fresh command sharing an existing temp home, for multi-step scenarios.
pub fn command_in(home: &Path) -> Command {
    let binary = assert_cmd::cargo::cargo_bin!("notedeck");
    let mut command = Command::new(binary);
    command.env("HOME", home);
    command.env("XDG_CONFIG_HOME", home.join(".config"));
    command.env_remove("RUST_LOG");
    command
}

pub fn config_dir(home: &Path) -> PathBuf {
    home.join(".config").join("notedeck")
}

pub fn write_config(home: &Path, body: &str) {
    let dir = config_dir(home);
    fs::create_dir_all(&dir).expect("create config dir");
    fs::write(dir.join("config.toml"), body).expect("write config");
}

pub fn assert_timestamp_log_names(entries: &[std::fs::DirEntry]) {
    assert!(!entries.is_empty(), "expected at least one diagnostics log");

    for entry in entries {
        let name = entry
            .file_name()
            .into_string()
            .expect("diagnostics filename utf8");
        let stem = name
            .strip_suffix(".log")
            .unwrap_or_else(|| panic!("diagnostics file should end with .log: {name}"));
        assert!(
            !stem.is_empty() && stem.chars().all(|character| character.is_ascii_digit()),
            "diagnostics filename must be <timestamp>.log, got: {name}"
        );
    }
}
