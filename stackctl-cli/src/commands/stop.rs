use stackctl::{Action, StackError};

pub async fn execute(global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let orchestrator = global.create_orchestrator(Action::Stop)?;
    let _lock = orchestrator.lock(Action::Stop)?;

    match orchestrator.stop().await {
        Ok(()) => {
            if !global.dry_run {
                println!("Services stopped");
            }
            Ok(())
        }
        Err(StackError::Teardown(errors)) => {
            anyhow::bail!(
                "Failed to stop {} service(s)\nErrors:\n  {}",
                errors.len(),
                errors.join("\n  ")
            )
        }
        Err(e) => Err(e.into()),
    }
}
