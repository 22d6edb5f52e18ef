//! `nsf-alertctl` binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use nsf_alertctl::cli::{Cli, Commands};
use nsf_alertctl::{commands, CliError};
use nsf_alerts::AlertsConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.json_logs) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("nsf_alerts=info,nsf_alertctl=info"))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = AlertsConfig::from_env()?;

    match cli.command {
        Commands::Send(args) => {
            // Delivery may print to stdout from a worker thread; lock only after it resolved.
            let report = commands::send(&config, args).await?;
            commands::write_report(&mut io::stdout().lock(), cli.format, &report)?;
        }
        Commands::ShowConfig => {
            commands::show_config(&mut io::stdout().lock(), cli.format, &config)?;
        }
    }

    Ok(())
}
