//! Startup behaviour of the `homework-bot` binary

#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Run the binary in an empty directory so no stray `.env` gets loaded
fn homework_bot(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("homework-bot").unwrap();
    cmd.current_dir(dir.path())
        .env_clear()
        .env("RUST_LOG", "info")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn missing_bot_token_exits_with_config_error() {
    let dir = TempDir::new().unwrap();

    homework_bot(&dir)
        .env("PRACTICUM_TOKEN", "prac-token")
        .env("TELEGRAM_CHAT_ID", "42")
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("TELEGRAM_TOKEN"))
        .stdout(predicate::str::contains("Poll loop started").not());
}

#[test]
fn no_credentials_lists_every_missing_variable() {
    let dir = TempDir::new().unwrap();

    homework_bot(&dir)
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("PRACTICUM_TOKEN"))
        .stdout(predicate::str::contains("TELEGRAM_TOKEN"))
        .stdout(predicate::str::contains("TELEGRAM_CHAT_ID"));
}

#[test]
fn invalid_retry_period_exits_with_config_error() {
    let dir = TempDir::new().unwrap();

    homework_bot(&dir)
        .env("PRACTICUM_TOKEN", "prac-token")
        .env("TELEGRAM_TOKEN", "123:bot-token")
        .env("TELEGRAM_CHAT_ID", "42")
        .env("RETRY_PERIOD_SECS", "often")
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("RETRY_PERIOD_SECS"));
}
