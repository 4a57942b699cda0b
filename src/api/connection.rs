//! Socket plumbing for the status API.
//!
//! The daemon accepts one short ASCII command per TCP connection and
//! answers with a single NUL-terminated line, so the connection layer is
//! deliberately small: a dialer that rides out the non-blocking connect
//! handshake with a bounded retry loop, and a byte-at-a-time line reader.
//!
//! # Lifecycle
//!
//! ```text
//! connect(config) ──non-blocking connect──► EINPROGRESS/EALREADY?
//!                                               │ yes (bounded retries)
//!                                               ▼
//!                                     sleep(retry_delay), connect again
//!                                               │ EISCONN / Ok
//!                                               ▼
//!                              set_nonblocking(false) + command timeout
//!
//! write(cmd) ──► read_line() until NUL / EOF ──► drop stream
//! ```
//!
//! The socket is blocking by the time it leaves this module; the session
//! layer can use plain `write_all` and `read` calls.

use std::io::{self, Read};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use super::ApiError;
use crate::config::ApiConfig;

/// Upper bound on one response line.
///
/// The protocol itself never states a limit; this guards against a
/// misbehaving peer streaming bytes without ever sending the terminator.
pub const MAX_RESPONSE_LEN: usize = 256 * 1024;

/// Open a connection to the daemon's status port.
///
/// The connect is issued on a non-blocking socket and re-tried while the
/// handshake reports itself in progress, up to `config.connect_attempts`
/// attempts with `config.retry_delay` between them. On success the socket
/// is switched back to blocking mode with the command timeout applied to
/// reads and writes, so callers get simple blocking I/O.
///
/// # Errors
///
/// Returns [`ApiError::Connect`] for resolution failures, non-transient
/// connect errors, and an exhausted retry budget.
pub fn connect(config: &ApiConfig) -> Result<TcpStream, ApiError> {
    let addr = resolve(&config.host, config.port)?;
    let domain = match addr {
        SocketAddr::V4(_) => Domain::IPV4,
        SocketAddr::V6(_) => Domain::IPV6,
    };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))
        .map_err(|err| ApiError::Connect(format!("socket create failed: {err}")))?;
    socket
        .set_nonblocking(true)
        .map_err(|err| ApiError::Connect(format!("set_nonblocking failed: {err}")))?;

    let target = SockAddr::from(addr);
    connect_with_retry(
        || socket.connect(&target),
        config.connect_attempts,
        config.retry_delay,
    )
    .map_err(|err| {
        ApiError::Connect(format!(
            "connect {}:{} failed: {err}",
            config.host, config.port
        ))
    })?;

    socket
        .set_nonblocking(false)
        .map_err(|err| ApiError::Connect(format!("set_nonblocking failed: {err}")))?;
    let stream = TcpStream::from(socket);
    stream
        .set_read_timeout(Some(config.command_timeout))
        .map_err(|err| ApiError::Connect(format!("set_read_timeout failed: {err}")))?;
    stream
        .set_write_timeout(Some(config.command_timeout))
        .map_err(|err| ApiError::Connect(format!("set_write_timeout failed: {err}")))?;
    Ok(stream)
}

/// Read one NUL-terminated line from `reader`.
///
/// Bytes are accumulated until the NUL terminator (excluded from the
/// result), a clean end of stream, or a read error. A mid-line error
/// keeps whatever already arrived; an error before the first byte is a
/// [`ApiError::Read`]. Lines longer
/// than [`MAX_RESPONSE_LEN`] are rejected as [`ApiError::Read`], and the
/// accumulated bytes must form valid UTF-8 ([`ApiError::Protocol`]).
pub fn read_line<R: Read>(reader: &mut R) -> Result<String, ApiError> {
    let mut line: Vec<u8> = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => break, // peer closed
            Ok(_) => {
                if byte[0] == b'\0' {
                    break;
                }
                if line.len() >= MAX_RESPONSE_LEN {
                    return Err(ApiError::Read(format!(
                        "response line exceeded {MAX_RESPONSE_LEN} bytes"
                    )));
                }
                line.push(byte[0]);
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) if !line.is_empty() => {
                log::debug!("read stopped after {} bytes: {err}", line.len());
                break;
            }
            Err(err) => return Err(ApiError::Read(err.to_string())),
        }
    }
    String::from_utf8(line)
        .map_err(|err| ApiError::Protocol(format!("response is not valid UTF-8: {err}")))
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, ApiError> {
    (host, port)
        .to_socket_addrs()
        .map_err(|err| ApiError::Connect(format!("resolve {host}:{port} failed: {err}")))?
        .next()
        .ok_or_else(|| ApiError::Connect(format!("resolve {host}:{port} returned no addresses")))
}

/// A connect error that means "still handshaking, ask again".
fn is_transient_connect(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }
    matches!(
        err.raw_os_error(),
        Some(libc::EINPROGRESS) | Some(libc::EALREADY)
    )
}

/// Drive `connect` until it succeeds or the attempt budget runs out.
///
/// Each call of the closure is one attempt; a transient result consumes
/// one attempt and sleeps `retry_delay` before the next. A re-issued
/// connect on a socket whose handshake completed reports `EISCONN`,
/// which counts as success. Any other error is returned as-is.
fn connect_with_retry<F>(mut connect: F, max_attempts: u32, retry_delay: Duration) -> io::Result<()>
where
    F: FnMut() -> io::Result<()>,
{
    let mut remaining = max_attempts;
    loop {
        match connect() {
            Ok(()) => return Ok(()),
            Err(err) if err.raw_os_error() == Some(libc::EISCONN) => return Ok(()),
            Err(err) if is_transient_connect(&err) && remaining > 1 => {
                remaining -= 1;
                log::trace!("connect in progress, {remaining} attempts left");
                thread::sleep(retry_delay);
            }
            Err(err) => return Err(err),
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────
