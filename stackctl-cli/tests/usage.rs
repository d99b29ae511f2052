use predicates::prelude::*;

mod common;

#[test]
fn test_no_action_prints_usage() {
    let mut ctx = common::stackctl();
    ctx.cmd
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("start | stop | install | erase"));

    assert!(!ctx.home.exists());
}

#[test]
fn test_unknown_action_is_named() {
    let mut ctx = common::stackctl();
    ctx.cmd.arg("restart");
    ctx.cmd
        .assert()
        .success()
        .stderr(predicate::str::contains("Unknown action: restart"))
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("systemctl").not())
        .stdout(predicate::str::contains("yum").not());

    assert!(!ctx.home.exists());
}

#[test]
fn test_unknown_action_in_dry_run_runs_nothing() {
    let mut ctx = common::stackctl();
    ctx.cmd.args(["--dry-run", "Start"]);
    ctx.cmd
        .assert()
        .success()
        .stderr(predicate::str::contains("Unknown action: Start"))
        .stdout(predicate::str::contains("systemctl").not());
}

#[test]
fn test_extra_argument_prints_usage() {
    let mut ctx = common::stackctl();
    ctx.cmd.args(["--dry-run", "start", "extra"]);
    ctx.cmd
        .assert()
        .success()
        .stderr(predicate::str::contains("extra"))
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("systemctl").not());

    assert!(!ctx.home.exists());
}

#[test]
fn test_unknown_flag_prints_usage() {
    let mut ctx = common::stackctl();
    ctx.cmd.arg("-x");
    ctx.cmd
        .assert()
        .success()
        .stderr(predicate::str::contains("-x"))
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("start | stop | install | erase"));

    assert!(!ctx.home.exists());
}

#[test]
fn test_version_is_printed() {
    let mut ctx = common::stackctl();
    ctx.cmd.arg("--version");
    ctx.cmd
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_actions() {
    let mut ctx = common::stackctl();
    ctx.cmd.arg("--help");
    ctx.cmd
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("erase"));
}
