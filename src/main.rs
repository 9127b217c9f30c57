//! vastup - keep the `vast` SSH host alias pointed at your current instance
//!
//! Rewrites the `Host vast` block in the SSH client config with fresh
//! connection details while carrying custom settings over, so `ssh vast`
//! keeps working after the instance moves.

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vastup::sshconfig::{self, ConnectionParams, HOST_ALIAS};

/// Register or refresh the `vast` host alias in the SSH client config
#[derive(Parser, Debug)]
#[command(name = "vastup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Hostname or IP address of the instance
    pub host: String,

    /// SSH port of the instance
    pub port: String,

    /// SSH user to connect as
    pub user: String,

    /// Path to the SSH config file (default: ~/.ssh/config)
    pub config_file: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

fn main() -> Result<()> {
    // Usage errors exit 1 with the usage text, before any file I/O.
    // --help and --version keep clap's success path.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                let _ = err.print();
                std::process::exit(0);
            }
            println!("{}", err);
            std::process::exit(1);
        }
    };

    // Initialize logging
    if cli.debug {
        tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::new("vastup=debug"))
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }

    let params = ConnectionParams::new(&cli.host, &cli.port, &cli.user);
    let report = sshconfig::update(&params, cli.config_file.as_deref())?;

    if report.created_file {
        println!("Created new SSH config file: {}", report.path.display());
    }
    if report.found_existing {
        println!("Found existing '{}' entry, preserving custom settings", HOST_ALIAS);
    }

    println!("SSH config updated successfully!");
    println!("  Host: {}", HOST_ALIAS);
    println!("  HostName: {}", cli.host);
    println!("  Port: {}", cli.port);
    println!("  User: {}", cli.user);
    println!();
    println!("You can now connect using: ssh {}", HOST_ALIAS);

    Ok(())
}
