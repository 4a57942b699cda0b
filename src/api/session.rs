//! Session orchestration: one bundle from three independent commands.
//!
//! Each command travels over its own fresh connection - the daemon closes
//! after answering, so nothing is reused. A command that fails leaves its
//! slot absent and never aborts its siblings; the bundle that comes back
//! is whatever subset of the three answers arrived.

use std::io::Write;

use serde::Serialize;

use super::connection::{connect, read_line};
use super::protocol::{decode, Record, RecordSet};
use super::ApiError;
use crate::config::ApiConfig;

/// Miner overview command.
pub const CMD_SUMMARY: &str = "summary";
/// Per-thread statistics command.
pub const CMD_THREADS: &str = "threads";
/// Share-time histogram command.
pub const CMD_HISTO: &str = "histo";

/// One command round-trip over one fresh connection.
///
/// The seam between orchestration and socket plumbing: production code
/// uses [`TcpTransport`], tests substitute canned responses.
pub trait Transport {
    /// Send `cmd` verbatim and return the raw response line.
    fn exchange(&self, cmd: &str) -> Result<String, ApiError>;
}

/// Production transport speaking to a real daemon over TCP.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    config: ApiConfig,
}

impl TcpTransport {
    /// Transport for the daemon described by `config`.
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }
}

impl Transport for TcpTransport {
    fn exchange(&self, cmd: &str) -> Result<String, ApiError> {
        let mut stream = connect(&self.config)?;
        stream
            .write_all(cmd.as_bytes())
            .map_err(|err| ApiError::Write(format!("send '{cmd}' failed: {err}")))?;
        read_line(&mut stream)
        // stream drops here, closing the connection on every path
    }
}

/// The three decoded status responses, ready for serialization.
///
/// A failed command serializes as `null`, an empty-but-successful one as
/// `{}` - consumers distinguish "daemon unreachable" from "nothing to
/// report".
#[derive(Debug, Clone, Default, Serialize)]
pub struct Bundle {
    /// The single record from `summary`, if any.
    pub summary: Option<Record>,
    /// Per-thread records from `threads`.
    pub threads: Option<RecordSet>,
    /// Histogram records from `histo`.
    pub histo: Option<RecordSet>,
}

/// Fetch `summary`, `threads`, and `histo` and assemble the bundle.
///
/// The three commands run sequentially and independently; errors are
/// logged and degrade to an absent slot. `summary` is special-cased: its
/// response carries a single record, which is extracted from the mapping
/// (the last-inserted one, should a daemon ever send several).
pub fn fetch_all<T: Transport>(transport: &T) -> Bundle {
    Bundle {
        summary: fetch(transport, CMD_SUMMARY)
            .and_then(|mut set| set.pop())
            .map(|(_, record)| record),
        threads: fetch(transport, CMD_THREADS),
        histo: fetch(transport, CMD_HISTO),
    }
}

fn fetch<T: Transport>(transport: &T, cmd: &str) -> Option<RecordSet> {
    match transport.exchange(cmd) {
        Ok(line) => {
            if line.is_empty() {
                log::warn!("'{cmd}' returned nothing");
            } else {
                log::debug!("'{cmd}' returned '{line}'");
            }
            Some(decode(&line))
        }
        Err(err) => {
            log::warn!("'{cmd}' failed: {err}");
            None
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────
