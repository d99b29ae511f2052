use predicates::prelude::*;
use rstest::rstest;

mod common;

#[test]
fn test_erase_dry_run_stops_before_removing() {
    let mut ctx = common::stackctl();
    ctx.cmd.args(["--dry-run", "erase"]);
    let output = ctx.cmd.assert().success().get_output().stdout.clone();
    let plan = String::from_utf8_lossy(&output);

    let last_stop = plan
        .find("systemctl stop openstack-glance-registry")
        .unwrap();
    for destructive in ["yum erase", "mysql --force", "vgremove -f", "rm -rf"] {
        let pos = plan
            .find(destructive)
            .unwrap_or_else(|| panic!("missing `{destructive}`"));
        assert!(last_stop < pos, "`{destructive}` before services stopped");
    }
}

#[test]
fn test_erase_dry_run_removes_swift_directories() {
    let mut ctx = common::stackctl();
    ctx.cmd.args(["--dry-run", "erase"]);
    ctx.cmd
        .assert()
        .success()
        .stdout(predicate::str::contains("/var/lib/swift"))
        .stdout(predicate::str::contains("DROP DATABASE IF EXISTS nova;"));
}

#[test]
fn test_erase_dry_run_keeps_credentials() {
    let ctx = common::stackctl();
    let creds = ctx.dir().join("keystonerc");
    std::fs::write(&creds, "export OS_USERNAME=admin\n").unwrap();

    ctx.new_cmd()
        .args(["--dry-run", "erase"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# remove credentials"));

    assert!(creds.exists());
}

#[rstest]
#[case("start")]
#[case("stop")]
#[case("install")]
#[case("erase")]
fn test_dry_run_debug_logs_to_stderr(#[case] action: &str) {
    let ctx = common::stackctl();
    ctx.new_cmd()
        .args(["--dry-run", "--debug", action])
        .assert()
        .success()
        .stderr(predicate::str::contains("dry-run"))
        .stdout(predicate::str::contains("DEBUG").not());
}
