use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use check_azure_license::cli::Cli;
use check_azure_license::{graph, probe};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Diagnostics go to stderr so the single plugin line on stdout stays
    // machine-readable. Silent unless RUST_LOG says otherwise.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let http = match graph::build_http_client(cli.insecure) {
        Ok(http) => http,
        Err(err) => {
            println!("{err}");
            return ExitCode::from(err.status().exit_code());
        }
    };

    match probe::run(&http, &cli).await {
        Ok(evaluation) => {
            println!("{}", evaluation.render());
            ExitCode::from(evaluation.status.exit_code())
        }
        Err(err) => {
            println!("{err}");
            ExitCode::from(err.status().exit_code())
        }
    }
}
