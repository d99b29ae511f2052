mod common;

#[test]
fn test_stop_dry_run_order() {
    let mut ctx = common::stackctl();
    ctx.cmd.args(["--dry-run", "stop"]);
    let output = ctx.cmd.assert().success().get_output().stdout.clone();

    let units: Vec<String> = common::plan_lines(&output, "systemctl")
        .into_iter()
        .filter_map(|l| l.strip_prefix("systemctl stop ").map(str::to_string))
        .collect();
    assert_eq!(
        units,
        [
            "openstack-keystone",
            "openstack-nova-api",
            "openstack-nova-objectstore",
            "openstack-nova-compute",
            "openstack-nova-network",
            "openstack-nova-volume",
            "openstack-nova-scheduler",
            "openstack-nova-cert",
            "openstack-glance-api",
            "openstack-glance-registry",
        ]
    );
}

#[test]
fn test_stop_leaves_database_running() {
    let mut ctx = common::stackctl();
    ctx.cmd.args(["--dry-run", "stop"]);
    let output = ctx.cmd.assert().success().get_output().stdout.clone();

    let lines = common::plan_lines(&output, "systemctl");
    assert!(lines.iter().all(|l| !l.ends_with("mysqld") && !l.ends_with("qpidd")));
}
