use anyhow::Result;
use clap::Parser;
use fatinject::{
    cli::Cli,
    env_utils,
    logging::Logger,
    prompt::{AssumeYes, Confirm, LinePrompt},
    workflow,
};

fn run(cli: Cli) -> Result<()> {
    let mut logger = Logger::from_env(cli.debug_enabled())?;
    let assume_yes = cli.yes || env_utils::assume_yes_from_env()?;
    let mut confirm: Box<dyn Confirm> = if assume_yes {
        Box::new(AssumeYes)
    } else {
        Box::new(LinePrompt::stdio())
    };

    workflow::run_inject(&mut logger, cli.into_run_options(), confirm.as_mut())?;
    logger.info("DONE!");
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}
