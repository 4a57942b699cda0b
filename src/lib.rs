//! Rigmon - monitoring front-end core for cpuminer-style mining daemons.
//!
//! The daemon exposes a line-based ASCII status protocol on a raw TCP
//! port. This crate is the client side of that protocol: it opens a
//! short-lived connection per command, writes the command text verbatim,
//! reads one NUL-terminated response line, and decodes the ad-hoc
//! `|`/`;`/`key=value` grammar into ordered records that serialize
//! directly to JSON.
//!
//! # Architecture
//!
//! - [`api::connection`] - socket plumbing: bounded non-blocking connect
//!   retry and the NUL-terminated line reader
//! - [`api::protocol`] - the record grammar and decoder
//! - [`api::session`] - the `summary`/`threads`/`histo` orchestration
//!   producing a [`Bundle`]
//! - [`config`] - connection parameters (host, port, timeouts)
//!
//! Rendering, field translation, and unit formatting are left to whatever
//! consumes the [`Bundle`]; the core only preserves what the daemon sent.

// Library modules
pub mod api;
pub mod config;

// Re-export commonly used types
pub use api::{
    connect, decode, fetch_all, read_line, ApiError, Bundle, Record, RecordSet, TcpTransport,
    Transport,
};
pub use config::ApiConfig;
