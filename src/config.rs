//! Connection configuration for the daemon status API.
//!
//! The stock monitoring page hard-codes the daemon address in global
//! constants; here everything the client needs travels in an explicit
//! [`ApiConfig`] handed to the dialer and the session layer, with
//! environment overrides for deployments that cannot pass flags.

use std::time::Duration;

/// How often a connect is re-issued while the handshake is in progress.
pub const DEFAULT_CONNECT_ATTEMPTS: u32 = 50;
/// Pause between connect attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_micros(50);
/// Socket read/write timeout for one command round-trip.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

/// Parameters for reaching one daemon's status API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Daemon host name or address.
    pub host: String,
    /// Daemon API port (the miner's `--api-bind` port).
    pub port: u16,
    /// Read/write timeout applied to each command's connection.
    pub command_timeout: Duration,
    /// Maximum connect attempts while the handshake is in progress.
    pub connect_attempts: u32,
    /// Delay between connect attempts.
    pub retry_delay: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 4048,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl ApiConfig {
    /// Default configuration with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("RIGMON_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("RIGMON_PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(err) => log::warn!("ignoring RIGMON_PORT '{port}': {err}"),
            }
        }
        if let Ok(ms) = std::env::var("RIGMON_TIMEOUT_MS") {
            match ms.parse() {
                Ok(ms) => self.command_timeout = Duration::from_millis(ms),
                Err(err) => log::warn!("ignoring RIGMON_TIMEOUT_MS '{ms}': {err}"),
            }
        }
    }
}
