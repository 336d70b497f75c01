//! Terraform Provider for FortiOS
//!
//! Terraform talks to the provider over stdin/stdout, one JSON request per
//! line; logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use terraform_provider_fortios::logging::LoggingConfig;
use terraform_provider_fortios::FortiosProvider;

/// Terraform Provider for FortiOS
#[derive(Parser, Debug)]
#[command(name = "terraform-provider-fortios", version)]
#[command(about = "Terraform provider for FortiGate / FortiOS")]
struct Args {
    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Terraform log level; any value enables debug logging
    #[arg(long, env = "TF_LOG", hide = true)]
    tf_log: Option<String>,

    /// Also write JSON logs to this directory
    #[arg(long, env = "FORTIOS_LOG_DIR")]
    log_file: Option<PathBuf>,

    /// Write console logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let debug = args.debug || args.tf_log.as_deref().is_some_and(|v| !v.is_empty());
    let _guard = LoggingConfig {
        log_dir: args.log_file,
        json_console: args.log_json,
        ..Default::default()
    }
    .debug(debug)
    .init()
    .context("initializing logging")?;

    tracing::info!("Starting Terraform Provider for FortiOS");

    let provider = FortiosProvider::new().context("creating async runtime")?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut stdout_lock = stdout.lock();

    for line in stdin.lock().lines() {
        let input = line.context("reading request")?;
        if input.trim().is_empty() {
            continue;
        }
        let response = provider.handle_request(&input);
        writeln!(stdout_lock, "{}", response).context("writing response")?;
        stdout_lock.flush().context("flushing stdout")?;
    }

    tracing::info!("Terraform Provider shutting down");
    Ok(())
}
