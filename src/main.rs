//! Rigmon CLI - query a mining daemon's status API and print the bundle.
//!
//! The JSON on stdout has the same shape the stock monitoring endpoint
//! serves: `{"summary": ..., "threads": ..., "histo": ...}`. A daemon
//! that cannot be reached still produces output - the affected slots are
//! `null` - so the exit code stays 0 for a partial bundle.

use anyhow::Result;
use clap::Parser;
use mimalloc::MiMalloc;
use rigmon::{fetch_all, ApiConfig, TcpTransport};

/// Global allocator configured per M-MIMALLOC-APPS guideline.
/// mimalloc provides better multi-threaded performance than the system allocator.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

// CLI
#[derive(Parser)]
#[command(name = "rigmon")]
#[command(version)]
#[command(about = "Query a mining daemon's status API and print the JSON bundle")]
struct Cli {
    /// Daemon host name or address (default 127.0.0.1, or RIGMON_HOST).
    #[arg(long)]
    host: Option<String>,

    /// Daemon API port (default 4048, or RIGMON_PORT).
    #[arg(long)]
    port: Option<u16>,

    /// Per-command socket timeout in milliseconds (default 2000, or RIGMON_TIMEOUT_MS).
    #[arg(long)]
    timeout_ms: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();
    let mut config = ApiConfig::from_env();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(ms) = cli.timeout_ms {
        config.command_timeout = std::time::Duration::from_millis(ms);
    }

    log::info!("querying {}:{}", config.host, config.port);
    let bundle = fetch_all(&TcpTransport::new(config));
    println!("{}", serde_json::to_string_pretty(&bundle)?);
    Ok(())
}
