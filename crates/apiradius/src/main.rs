mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // `debug` may also come from the config file or REST_API_DEBUG. Load
    // errors are reported by the command itself.
    let debug_bodies =
        cli.global.debug || config::load(&cli.global).is_ok_and(|cfg| cfg.debug);
    init_tracing(cli.global.verbose, debug_bodies);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, debug_bodies: bool) {
    let filter = match (verbosity, debug_bodies) {
        (0, false) => "warn",
        (0, true) => "warn,apiradius_api=debug",
        (1, false) => "info",
        (1, true) => "info,apiradius_api=debug",
        (2, _) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Config(args) => commands::config_cmd::handle(&args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "apiradius", &mut std::io::stdout());
            Ok(())
        }

        Command::Profile(args) => {
            tracing::debug!(command = ?args.command, "dispatching profile command");
            commands::profile::handle(args, &cli.global).await
        }
    }
}
