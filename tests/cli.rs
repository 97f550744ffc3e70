use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn write_zip(path: &Path, entry: &str, body: &[u8]) {
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file(entry, SimpleFileOptions::default()).unwrap();
    zip.write_all(body).unwrap();
    zip.finish().unwrap();
}

fn unarchive_in(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("unarchive").unwrap();
    cmd.current_dir(dir).write_stdin("");
    cmd
}

#[test]
fn version_flags_print_version_and_extract_nothing() {
    let temp_dir = TempDir::new().unwrap();
    write_zip(&temp_dir.path().join("a.zip"), "a.txt", b"a");

    for flag in ["--version", "-v"] {
        unarchive_in(temp_dir.path())
            .arg(flag)
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    assert!(!temp_dir.path().join("a.txt").exists());
}

#[test]
fn unknown_flag_exits_with_one() {
    let temp_dir = TempDir::new().unwrap();

    unarchive_in(temp_dir.path())
        .arg("--bogus")
        .assert()
        .code(1);
}

#[test]
fn all_flag_extracts_every_archive() {
    let temp_dir = TempDir::new().unwrap();
    write_zip(&temp_dir.path().join("a.zip"), "a.txt", b"first");
    write_zip(&temp_dir.path().join("b.zip"), "nested/b.txt", b"second");

    unarchive_in(temp_dir.path())
        .arg("--all")
        .assert()
        .success()
        .stdout(predicate::str::contains("Extraction finished"));

    assert_eq!(fs::read(temp_dir.path().join("a.txt")).unwrap(), b"first");
    assert_eq!(
        fs::read(temp_dir.path().join("nested/b.txt")).unwrap(),
        b"second"
    );
}

#[test]
fn corrupt_archive_is_reported_and_batch_continues() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("a_broken.zip"), b"not a zip").unwrap();
    write_zip(&temp_dir.path().join("b_good.zip"), "good.txt", b"good");

    unarchive_in(temp_dir.path())
        .args(["--all", "--no-progress"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Extraction finished"))
        .stderr(predicate::str::contains("a_broken.zip"));

    assert_eq!(fs::read(temp_dir.path().join("good.txt")).unwrap(), b"good");
}

#[test]
fn failed_archive_is_reported_once() {
    let temp_dir = TempDir::new().unwrap();
    write_zip(&temp_dir.path().join("a.zip"), "a.txt", b"a");
    fs::write(temp_dir.path().join("b.zip"), b"not a zip").unwrap();
    write_zip(&temp_dir.path().join("c.zip"), "c.txt", b"c");

    let output = unarchive_in(temp_dir.path())
        .args(["--all", "--no-progress"])
        .env_remove("RUST_LOG")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mentions = stderr.lines().filter(|line| line.contains("b.zip")).count();
    assert_eq!(mentions, 1, "stderr was:\n{}", stderr);
    assert!(temp_dir.path().join("c.txt").exists());
}

#[test]
fn json_summary_is_one_line() {
    let temp_dir = TempDir::new().unwrap();
    write_zip(&temp_dir.path().join("a.zip"), "a.txt", b"a");

    let output = unarchive_in(temp_dir.path())
        .args(["--all", "--output-format", "json", "--no-progress"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines().filter(|line| !line.trim().is_empty()) {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(value.get("type").is_some(), "untyped line: {}", line);
    }
    assert!(stdout.contains("\"type\":\"summary\""));
}

#[test]
fn strict_mode_exits_with_two_on_failure() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("broken.zip"), b"not a zip").unwrap();

    unarchive_in(temp_dir.path())
        .args(["--all", "--strict"])
        .assert()
        .code(2);
}

#[test]
fn bulk_strategy_creates_directory_per_archive() {
    let temp_dir = TempDir::new().unwrap();
    write_zip(&temp_dir.path().join("foo.zip"), "inner.txt", b"bulk");

    unarchive_in(temp_dir.path())
        .args(["--all", "--strategy", "bulk"])
        .assert()
        .success();

    assert_eq!(
        fs::read(temp_dir.path().join("foo/inner.txt")).unwrap(),
        b"bulk"
    );
    assert!(!temp_dir.path().join("inner.txt").exists());
}

#[test]
fn dry_run_creates_nothing() {
    let temp_dir = TempDir::new().unwrap();
    write_zip(&temp_dir.path().join("foo.zip"), "inner.txt", b"x");

    unarchive_in(temp_dir.path())
        .args(["--all", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("foo.zip"));

    assert!(!temp_dir.path().join("inner.txt").exists());
}

#[test]
fn unanswered_prompt_extracts_nothing() {
    let temp_dir = TempDir::new().unwrap();
    write_zip(&temp_dir.path().join("a.zip"), "a.txt", b"a");

    unarchive_in(temp_dir.path()).assert().success();

    assert!(!temp_dir.path().join("a.txt").exists());
}

#[test]
fn config_file_selects_bulk_strategy() {
    let temp_dir = TempDir::new().unwrap();
    write_zip(&temp_dir.path().join("pkg.zip"), "file.txt", b"cfg");
    fs::write(
        temp_dir.path().join("unarchive.toml"),
        "[extraction]\nstrategy = \"bulk\"\n\n[selection]\nextract_all = true\n",
    )
    .unwrap();

    unarchive_in(temp_dir.path()).assert().success();

    assert_eq!(
        fs::read(temp_dir.path().join("pkg/file.txt")).unwrap(),
        b"cfg"
    );
}

#[test]
fn json_output_reports_outcomes() {
    let temp_dir = TempDir::new().unwrap();
    write_zip(&temp_dir.path().join("a.zip"), "a.txt", b"a");

    unarchive_in(temp_dir.path())
        .args(["--all", "--output-format", "json", "--no-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\":\"success\""));
}
