//! Shared fixtures for the CLI tests: fake tools written as shell scripts.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Write an executable `/bin/sh` script
pub fn write_script(path: &Path, body: &str) {
    fs::write(path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write script");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("Failed to chmod script");
}

/// A fake construction tool: echoes its arguments, creates `<input><suffix>`
/// for each aggregate suffix and `<input>.<i><suffix>` for each thread, then
/// exits with `status`.
pub fn fake_stage(path: &Path, aggregate: &[&str], per_thread: &[&str], status: i32) {
    let mut body = String::from(
        r#"in="$1"; shift
th=1
echo "$(basename "$0") $in $*"
while [ $# -gt 0 ]; do
  case "$1" in -t) th="$2"; shift;; esac
  shift
done
"#,
    );
    for suffix in aggregate {
        body.push_str(&format!(": > \"$in{}\"\n", suffix));
    }
    if !per_thread.is_empty() {
        body.push_str("i=0\nwhile [ $i -lt $th ]; do\n");
        for suffix in per_thread {
            body.push_str(&format!("  : > \"$in.$i{}\"\n", suffix));
        }
        body.push_str("  i=$((i+1))\ndone\n");
    }
    body.push_str(&format!("exit {}", status));
    write_script(path, &body);
}

/// Run the `stpd` binary with `--config <config>` and `args`
pub fn stpd(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stpd"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to run stpd")
}

/// `<path><suffix>`
pub fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// Write a config file pointing the tools at `tools`
pub fn write_config(dir: &Path, tools: serde_json::Value, extra: serde_json::Value) -> PathBuf {
    let mut config = serde_json::json!({
        "base_dir": dir,
        "tools": tools,
        "timeout_secs": 60,
    });
    if let (Some(base), Some(extra)) = (config.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            base.insert(k.clone(), v.clone());
        }
    }
    let path = dir.join("stpd.json");
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    path
}
