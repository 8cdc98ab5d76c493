use clap::Parser;
use skypol::config::cli::{Cli, Command};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout is reserved for command output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Params => skypol::commands::params::run()?,
        Command::Simulate(args) => skypol::commands::simulate::run(&args)?,
        Command::Render(args) => skypol::commands::render::run(&args)?,
        Command::Estimate(args) => skypol::commands::estimate::run(&args)?,
    }

    Ok(())
}
