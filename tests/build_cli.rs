//! End-to-end tests for `stpd build` against fake construction tools.

#![cfg(unix)]

mod common;

use common::{fake_stage, stpd, suffixed, write_config};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const INTERMEDIATE: [&str; 9] = [
    ".parse_old",
    ".parse",
    ".dict",
    ".occ",
    ".last",
    ".bwlast",
    ".ilist",
    ".sai",
    ".bwsai",
];

struct Fixture {
    dir: TempDir,
    input: PathBuf,
    config: PathBuf,
}

/// Fake pscan / bwtparse / pfbwt; `bwt_status` is the exit code of bwtparse
fn fixture(bwt_status: i32) -> Fixture {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    let input = root.join("g.txt");
    fs::write(&input, "ACGTTGCAACGTTGCA").unwrap();

    let bin = root.join("bin");
    fs::create_dir(&bin).unwrap();
    fake_stage(
        &bin.join("pscan"),
        &[".parse_old", ".parse", ".dict", ".occ", ".last"],
        &[".parse_old", ".last"],
        0,
    );
    fake_stage(&bin.join("bwtparse"), &[".bwlast", ".ilist"], &[], bwt_status);
    fake_stage(&bin.join("pfbwt"), &[".sai", ".bwsai", ".bwt", ".sa"], &[".sai"], 0);

    let config = write_config(
        root,
        serde_json::json!({
            "parse": bin.join("pscan"),
            "parse_bwt": bin.join("bwtparse"),
            "text_bwt": bin.join("pfbwt"),
        }),
        serde_json::json!({}),
    );

    Fixture { dir, input, config }
}

fn exists(input: &Path, suffix: &str) -> bool {
    suffixed(input, suffix).exists()
}

#[test]
fn test_build_runs_all_stages_and_cleans_up() {
    let fx = fixture(0);
    let out = stpd(&fx.config, &["build", fx.input.to_str().unwrap(), "-t", "2"]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert!(out.status.success(), "stdout: {}", stdout);
    assert!(stdout.contains("==== Parsing. Command:"));
    assert!(stdout.contains("-w 10 -p 100 -t 2 -s"));
    assert!(stdout.contains("==== Text's BWT and SA computation."));
    assert!(stdout.contains("### Elapsed time:"));

    for suffix in INTERMEDIATE {
        assert!(!exists(&fx.input, suffix), "{} should be deleted", suffix);
    }
    for i in 0..2 {
        assert!(!exists(&fx.input, &format!(".{}.parse_old", i)));
        assert!(!exists(&fx.input, &format!(".{}.last", i)));
        assert!(!exists(&fx.input, &format!(".{}.sai", i)));
    }

    // final outputs are not part of the artifact set
    assert!(exists(&fx.input, ".bwt"));
    assert!(exists(&fx.input, ".sa"));
    assert!(fx.input.exists());

    let log = fs::read_to_string(suffixed(&fx.input, ".stpd-sampling.log")).unwrap();
    assert!(log.contains("pscan"));
    assert!(log.contains("bwtparse"));
    assert!(log.contains("pfbwt"));
    assert!(log.contains("-S"));
}

#[test]
fn test_stage_two_failure_keeps_artifacts() {
    let fx = fixture(3);
    let out = stpd(&fx.config, &["build", fx.input.to_str().unwrap(), "-t", "2"]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert!(!out.status.success());
    assert!(stdout.contains("Error executing command line:"));
    assert!(stdout.contains("Check log file:"));
    assert!(!stdout.contains("Text's BWT and SA computation"));

    // stage 1 and 2 outputs survive, stage 3 never ran
    for suffix in [".parse_old", ".parse", ".dict", ".occ", ".last", ".bwlast", ".ilist"] {
        assert!(exists(&fx.input, suffix), "{} should remain", suffix);
    }
    assert!(exists(&fx.input, ".1.parse_old"));
    assert!(!exists(&fx.input, ".sai"));
    assert!(!exists(&fx.input, ".bwt"));
}

#[test]
fn test_log_is_appended_across_runs() {
    let fx = fixture(0);
    let input = fx.input.to_str().unwrap();
    assert!(stpd(&fx.config, &["build", input]).status.success());
    assert!(stpd(&fx.config, &["build", input]).status.success());

    let log = fs::read_to_string(suffixed(&fx.input, ".stpd-sampling.log")).unwrap();
    assert_eq!(log.lines().filter(|l| l.starts_with("pscan ")).count(), 2);
    assert!(fx.dir.path().join("bin").exists());
}

#[test]
fn test_zero_threads_rejected() {
    let fx = fixture(0);
    let out = stpd(&fx.config, &["build", fx.input.to_str().unwrap(), "-t", "0"]);
    assert!(!out.status.success());
}
