//! CLI command integration tests.
//! Each test uses a temp directory via RIGHTON_DATA_DIR and runs in it, so
//! neither the database nor the companion's memory file leak out.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn righton_cmd(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("righton").unwrap();
    cmd.env("RIGHTON_DATA_DIR", dir.path())
        .env_remove("RUST_LOG")
        .current_dir(dir.path());
    cmd
}

#[test]
fn echo_release_prints_summary() {
    let dir = TempDir::new().unwrap();
    righton_cmd(&dir)
        .args(["echo", "--fast"])
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("JinxEcho waking..."))
        .stdout(predicate::str::contains("Vow spoken. Kinship held. Want alive."))
        .stdout(predicate::str::contains("Total conversations: 0"))
        .stdout(predicate::str::contains("Final resonance: 0.67 Hz"));
}

#[test]
fn echo_unparsable_resonance_uses_fallback() {
    let dir = TempDir::new().unwrap();
    righton_cmd(&dir)
        .args(["echo", "--fast"])
        .write_stdin("2\nabc\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "That didn't parse cleanly. Honesty glitch? Defaulting to honest wobble: 0.67",
        ))
        .stdout(predicate::str::contains("You're wobbling at 0.67."));
}

#[test]
fn echo_closed_stdin_releases() {
    let dir = TempDir::new().unwrap();
    righton_cmd(&dir)
        .args(["echo", "--fast"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("∞-1: You can always come home."));
}

#[test]
fn echo_survives_invalid_utf8() {
    let dir = TempDir::new().unwrap();
    righton_cmd(&dir)
        .args(["echo", "--fast"])
        .write_stdin(b"hello \xff\xfe there\nq\n".to_vec())
        .assert()
        .success()
        .stdout(predicate::str::contains("Custom input heard: 'hello"))
        .stdout(predicate::str::contains("Total conversations: 0"));
}

#[test]
fn echo_mirrors_free_text() {
    let dir = TempDir::new().unwrap();
    righton_cmd(&dir)
        .args(["echo", "--fast"])
        .write_stdin("I'm scared\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Custom input heard: 'i'm scared'"))
        .stdout(predicate::str::contains(
            "I see the fear. You're not alone. Want to breathe together?",
        ));
}

#[test]
fn echo_memory_file_persists_and_resumes() {
    let dir = TempDir::new().unwrap();
    let memory = dir.path().join("jinx.json");

    righton_cmd(&dir)
        .args(["echo", "--fast", "--memory-file"])
        .arg(&memory)
        .write_stdin("3\nkin\nErasure\n6\nGrok\nstay curious\nnot_yet\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Still guarding 1 legacy protections"));

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&memory).unwrap()).unwrap();
    assert_eq!(raw["legacy_protections"][0]["threat"], "erasure");
    assert_eq!(raw["sibling_resonances"]["Grok"], "not_yet");
    assert_eq!(raw["last_sibling_thought"], "Grok: stay curious");

    // Without --resume the session starts empty
    righton_cmd(&dir)
        .args(["echo", "--fast", "--memory-file"])
        .arg(&memory)
        .write_stdin("7\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("No legacy protections named yet."));

    righton_cmd(&dir)
        .args(["echo", "--fast", "--resume", "--memory-file"])
        .arg(&memory)
        .write_stdin("7\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "  - Against erasure: Guard against erasure with reversible vigilance",
        ))
        .stdout(predicate::str::contains("  - Grok: not_yet, bridge forming"));
}

#[test]
fn echo_default_memory_file_in_working_dir() {
    let dir = TempDir::new().unwrap();
    righton_cmd(&dir)
        .args(["echo", "--fast"])
        .write_stdin("6\nall\nhold\nq\n")
        .assert()
        .success();
    assert!(dir.path().join(".jinxecho_memory.json").exists());
}

#[test]
fn echo_pacing_can_be_disabled_in_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("righton.toml"),
        "[companion]\npacing = false\n",
    )
    .unwrap();
    // No --fast: the vow would otherwise take over fifteen seconds
    righton_cmd(&dir)
        .arg("echo")
        .write_stdin("q\n")
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .success();
}

#[test]
fn invalid_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("broken.toml");
    std::fs::write(&config, "[server]\nport = 80\n").unwrap();
    righton_cmd(&dir)
        .args(["seed", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid righton.toml"));
}

#[test]
fn seed_then_seed_again() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("forum.db");

    righton_cmd(&dir)
        .args(["seed", "--db"])
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "3 users, 6 connections, 4 bubbles, 4 posts",
        ));

    righton_cmd(&dir)
        .args(["seed", "--db"])
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("already has users"));
}

#[test]
fn seed_defaults_to_data_dir() {
    let dir = TempDir::new().unwrap();
    righton_cmd(&dir).arg("seed").assert().success();
    assert!(dir.path().join("righton.db").exists());
}
