use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

mod aws;
mod commands;
mod common;
mod credentials;
mod error;
mod idp;
mod login;
mod prompt;

use commands::LoginCommand;

#[derive(Parser)]
#[command(
    name = "fedsso",
    about = "Federated SSO login to AWS for the CLI",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(flatten)]
    login: LoginCommand,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Force stdout to be line buffered
    let _ = io::stdout().flush();

    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over the flags
    let log_level = if cli.verbose { "debug" } else { &cli.log_level };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    print_banner();

    login::run(cli.login).await?;

    Ok(())
}

fn print_banner() {
    println!();
    println!("🔐 Federated SSO Login for AWS CLI");
    println!();
    io::stdout().flush().unwrap();
}
