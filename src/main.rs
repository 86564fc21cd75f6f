use std::net::SocketAddr;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use organizesee::api::{
    Cli, Command, growth_report, required_yield_report, retirement_report, run_http_server,
};

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    let report = match cli.command {
        Command::Serve { host, port } => {
            if let Err(e) = run_http_server(SocketAddr::new(host, port)).await {
                error!(error = %e, "server stopped");
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
            return;
        }
        Command::Growth { args, json } => growth_report(&args, json),
        Command::Retirement { args, json } => retirement_report(&args, json),
        Command::RequiredYield { args, json } => required_yield_report(&args, json),
    };

    match report {
        Ok(out) => println!("{}", out.trim_end()),
        Err(e) => {
            error!(error = %e, "calculation rejected");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

// Logs go to stderr so `--json` output on stdout stays machine readable.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "organizesee=info".into()),
        )
        .init();
}
