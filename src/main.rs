use anyhow::Result;
use clap::Parser;

use mailferry::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Forward => mailferry::session::run(config),
        Commands::List => mailferry::session::list(config),
        Commands::SendTest { message } => mailferry::gateway::send_test(config, &message),
        Commands::Init { path, force } => mailferry::init::run(&path, force),
    }
}
