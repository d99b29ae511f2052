use stackctl::Action;

pub async fn execute(global: &crate::cli::GlobalFlags) -> anyhow::Result<()> {
    let orchestrator = global.create_orchestrator(Action::Install)?;
    let _lock = orchestrator.lock(Action::Install)?;

    let report = orchestrator.install().await?;

    for test in &report.smoke_tests {
        println!("$ {}", test.command);
        print!("{}", test.output.stdout);
        if !test.output.stdout.ends_with('\n') {
            println!();
        }
    }
    println!();
    println!(
        "Admin credentials: source {}",
        report.credentials_path.display()
    );
    println!("Check the output above: both commands should list entries without errors.");
    Ok(())
}
