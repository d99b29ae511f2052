//! Integration tests for start/stop ordering and failure handling.

use stackctl::catalog::{self, START_ORDER, STOP_ORDER};
use stackctl::errors::StackError;
use stackctl::exec::CommandOutput;
use stackctl::options::ReadinessPolicy;
use stackctl_test_utils::{RecordingRunner, TestContext};
use std::collections::HashSet;

fn units(services: &[catalog::Service]) -> Vec<String> {
    services.iter().map(|s| s.unit.to_string()).collect()
}

// ============================================================================
// START
// ============================================================================

#[tokio::test]
async fn start_issues_every_unit_once_in_order() {
    let ctx = TestContext::new();
    ctx.orchestrator().start().await.unwrap();

    let started = ctx.runner.units("start");
    assert_eq!(started, units(START_ORDER));

    let distinct: HashSet<_> = started.iter().collect();
    assert_eq!(distinct.len(), started.len());
}

#[tokio::test]
async fn start_creates_volume_group_between_image_and_compute() {
    let ctx = TestContext::new();
    ctx.orchestrator().start().await.unwrap();

    let lines = ctx.runner.command_lines();
    let pos = |needle: &str| {
        lines
            .iter()
            .position(|l| l == needle)
            .unwrap_or_else(|| panic!("missing `{needle}` in {lines:#?}"))
    };

    let registry = pos("systemctl start openstack-glance-registry");
    let vgcreate = pos("vgcreate nova-volumes /dev/loop0");
    let nova_api = pos("systemctl start openstack-nova-api");
    assert!(registry < vgcreate);
    assert!(vgcreate < nova_api);
    assert!(ctx.runner.calls_to("vgchange", &[]).is_empty());
}

#[tokio::test]
async fn start_reuses_attached_loop_device_and_existing_group() {
    let runner = RecordingRunner::new();
    runner.respond(
        "losetup",
        &["-j"],
        CommandOutput::success()
            .with_stdout("/dev/loop7: [64768]:99 (/var/lib/nova/nova-volumes.img)\n"),
    );
    let ctx = TestContext::with_runner(runner);
    ctx.orchestrator().start().await.unwrap();

    assert!(ctx.runner.calls_to("losetup", &["--show"]).is_empty());
    assert!(ctx.runner.calls_to("vgcreate", &[]).is_empty());
    assert_eq!(ctx.runner.calls_to("vgchange", &["-ay", "nova-volumes"]).len(), 1);
}

#[tokio::test]
async fn start_waits_for_database_before_identity() {
    let runner = RecordingRunner::fresh_host();
    runner.respond_sequence(
        "systemctl",
        &["is-active", "--quiet", "mysqld"],
        vec![
            CommandOutput::failure(3, ""),
            CommandOutput::failure(3, ""),
            CommandOutput::success(),
        ],
    );
    let ctx = TestContext::with_runner(runner);
    ctx.orchestrator().start().await.unwrap();

    let polls = ctx.runner.calls_to("systemctl", &["is-active", "--quiet", "mysqld"]);
    assert_eq!(polls.len(), 3);

    let lines = ctx.runner.command_lines();
    let last_poll = lines
        .iter()
        .rposition(|l| l == "systemctl is-active --quiet mysqld")
        .unwrap();
    let keystone = ctx
        .runner
        .position("systemctl", &["start", "openstack-keystone"])
        .unwrap();
    assert!(last_poll < keystone);
}

#[tokio::test]
async fn start_times_out_when_identity_never_comes_up() {
    let runner = RecordingRunner::fresh_host();
    runner.respond(
        "systemctl",
        &["is-active", "--quiet", "openstack-keystone"],
        CommandOutput::failure(3, ""),
    );
    let ctx = TestContext::with_runner(runner);

    let err = ctx.orchestrator().start().await.unwrap_err();
    match err {
        StackError::Timeout { what, .. } => assert_eq!(what, "openstack-keystone"),
        other => panic!("expected timeout, got {other:?}"),
    }
    assert!(ctx.runner.units("start").iter().all(|u| !u.starts_with("openstack-glance")));
}

#[tokio::test]
async fn start_stops_at_first_failing_unit() {
    let runner = RecordingRunner::fresh_host();
    runner.fail(
        "systemctl",
        &["start", "openstack-glance-api"],
        "Job for openstack-glance-api.service failed.",
    );
    let ctx = TestContext::with_runner(runner);

    let err = ctx.orchestrator().start().await.unwrap_err();
    assert!(err.to_string().contains("openstack-glance-api"));

    let started = ctx.runner.units("start");
    assert_eq!(started.last().map(String::as_str), Some("openstack-glance-api"));
    assert!(ctx.runner.calls_to("losetup", &[]).is_empty());
}

#[tokio::test]
async fn fixed_delay_policy_does_not_poll() {
    let mut ctx = TestContext::new();
    ctx.options.readiness = ReadinessPolicy::FixedDelay { secs: 0 };
    ctx.orchestrator().start().await.unwrap();

    assert!(ctx.runner.calls_to("systemctl", &["is-active"]).is_empty());
    assert_eq!(ctx.runner.units("start"), units(START_ORDER));
}

// ============================================================================
// STOP
// ============================================================================

#[tokio::test]
async fn stop_takes_identity_then_compute_then_image_down() {
    let ctx = TestContext::new();
    ctx.orchestrator().stop().await.unwrap();

    assert_eq!(ctx.runner.units("stop"), units(STOP_ORDER));
    assert!(!ctx.runner.units("stop").contains(&"mysqld".to_string()));
}

#[tokio::test]
async fn stop_attempts_every_unit_and_reports_failures() {
    let runner = RecordingRunner::fresh_host();
    runner.fail("systemctl", &["stop", "openstack-nova-network"], "busy");
    runner.fail("systemctl", &["stop", "openstack-glance-api"], "busy");
    let ctx = TestContext::with_runner(runner);

    let err = ctx.orchestrator().stop().await.unwrap_err();
    match err {
        StackError::Teardown(failures) => {
            assert_eq!(failures.len(), 2);
            assert!(failures[0].starts_with("openstack-nova-network"));
            assert!(failures[1].starts_with("openstack-glance-api"));
        }
        other => panic!("expected teardown error, got {other:?}"),
    }
    assert_eq!(ctx.runner.units("stop"), units(STOP_ORDER));
}
