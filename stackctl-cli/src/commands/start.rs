use stackctl::Action;

pub async fn execute(global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let orchestrator = global.create_orchestrator(Action::Start)?;
    let _lock = orchestrator.lock(Action::Start)?;

    orchestrator.start().await?;

    if !global.dry_run {
        println!("All services started");
    }
    Ok(())
}
