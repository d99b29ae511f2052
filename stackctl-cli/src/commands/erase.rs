use stackctl::{Action, StackError};

pub async fn execute(global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let orchestrator = global.create_orchestrator(Action::Erase)?;
    let _lock = orchestrator.lock(Action::Erase)?;

    match orchestrator.erase().await {
        Ok(()) => {
            if !global.dry_run {
                println!("OpenStack erased from this host");
            }
            Ok(())
        }
        // Every step already ran; list what is left behind.
        Err(StackError::Teardown(errors)) => {
            anyhow::bail!(
                "Erase finished with {} failed step(s)\nErrors:\n  {}",
                errors.len(),
                errors.join("\n  ")
            )
        }
        Err(e) => Err(e.into()),
    }
}
