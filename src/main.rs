// src/main.rs
use anyhow::Error;
use clap::Parser;
use pnote::cli::args::Args;
use pnote::domain::DomainError;
use pnote::ports::alert_message;
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging based on verbosity
    let filter = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("pnote={}", filter).parse().unwrap()),
        )
        .init();

    match pnote::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

/// Domain failures lead with their fixed message; the full chain goes to the debug log.
fn report(error: &Error) {
    match error.downcast_ref::<DomainError>() {
        Some(domain) => {
            debug!(error = ?error, "Command failed");
            eprintln!("Error: {}\n  {}", alert_message(domain), domain);
        }
        None => eprintln!("Error: {:#}", error),
    }
}
