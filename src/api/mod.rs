//! Client for the daemon's line-based status protocol.
//!
//! Wire format:
//!
//! ```text
//! request:  the literal command text ("summary", "threads", "histo"),
//!           no framing, one command per TCP connection
//! response: a single line terminated by a NUL byte (or stream close)
//!
//! line    := record ( '|' record )* '|'?
//! record  := field ( ';' field )*
//! field   := key '=' value | value
//! ```
//!
//! Only the first `=` in a field splits key from value; later `=` bytes
//! belong to the value. A record's first field doubles as its name:
//! `NAME=cpuminer-opt;VER=3.8;…` names the record `NAMEcpuminer-opt`.
//! Duplicate names within one response get integer suffixes in encounter
//! order.
//!
//! # Module Organization
//!
//! - `connection`: dialer with bounded non-blocking connect retry, plus
//!   the NUL-terminated line reader
//! - `protocol`: record grammar, ordered data model, decoder
//! - `session`: per-command transport seam and the three-command bundle

// Submodules
pub mod connection;
pub mod protocol;
pub mod session;

// Re-exports for public API
pub use connection::{connect, read_line, MAX_RESPONSE_LEN};
pub use protocol::{decode, Record, RecordSet};
pub use session::{fetch_all, Bundle, TcpTransport, Transport, CMD_HISTO, CMD_SUMMARY, CMD_THREADS};

/// Categorized failures from one command's fetch.
///
/// Each variant carries the underlying error text; the session layer
/// converts any of these into an absent slot in the [`Bundle`] rather
/// than letting one command's failure abort its siblings.
#[derive(Debug)]
pub enum ApiError {
    /// Socket creation or connect failure, including exhausted retries.
    Connect(String),
    /// The command text could not be sent.
    Write(String),
    /// The response line could not be read, or exceeded the length cap.
    Read(String),
    /// The response bytes were not decodable text.
    Protocol(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect(msg) => write!(f, "connect failed: {msg}"),
            Self::Write(msg) => write!(f, "write failed: {msg}"),
            Self::Read(msg) => write!(f, "read failed: {msg}"),
            Self::Protocol(msg) => write!(f, "protocol error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}
