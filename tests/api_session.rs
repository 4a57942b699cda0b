//! Loopback integration tests: real sockets, canned daemon.
//!
//! A thread plays the daemon side of the status protocol on an ephemeral
//! port - one command per connection, NUL-terminated reply - and the
//! full client stack (dialer, line reader, decoder, session) runs
//! against it.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rigmon::{fetch_all, ApiConfig, TcpTransport};

const SUMMARY_LINE: &str = "NAME=cpuminer-opt;VER=3.8.8.1;API=1.0;ALGO=sha256d;CPUS=2;KHS=125.20;ACC=4;REJ=0;UPTIME=60;TS=1520000000|";
const THREADS_LINE: &str = "CPU=0;H/s=64000.00|CPU=1;H/s=61250.00|";

fn config_for(port: u16) -> ApiConfig {
    ApiConfig {
        host: "127.0.0.1".to_owned(),
        port,
        command_timeout: Duration::from_secs(2),
        ..ApiConfig::default()
    }
}

/// Serve `connections` command round-trips, then exit.
///
/// Replies are NUL-terminated unless the command is `histo`, which closes
/// the stream without a terminator to exercise the EOF path.
fn spawn_daemon(connections: usize) -> (u16, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let port = listener.local_addr().expect("local addr").port();
    let handle = thread::spawn(move || {
        for _ in 0..connections {
            let (mut sock, _) = listener.accept().expect("accept");
            let mut buf = [0u8; 64];
            let n = sock.read(&mut buf).expect("read command");
            let cmd = std::str::from_utf8(&buf[..n]).expect("utf8 command");
            match cmd {
                "summary" => {
                    sock.write_all(SUMMARY_LINE.as_bytes()).expect("write");
                    sock.write_all(b"\0").expect("write terminator");
                }
                "threads" => {
                    sock.write_all(THREADS_LINE.as_bytes()).expect("write");
                    sock.write_all(b"\0").expect("write terminator");
                }
                // No terminator: the client must treat stream close as
                // end of line.
                "histo" => sock.write_all(b"").expect("write"),
                other => panic!("unexpected command '{other}'"),
            }
        }
    });
    (port, handle)
}

#[test]
fn full_bundle_over_loopback() {
    let (port, daemon) = spawn_daemon(3);
    let bundle = fetch_all(&TcpTransport::new(config_for(port)));
    daemon.join().expect("daemon thread");

    let summary = bundle.summary.expect("summary slot");
    assert_eq!(summary.get("NAME").unwrap(), "cpuminer-opt");
    assert_eq!(summary.get("ALGO").unwrap(), "sha256d");
    assert_eq!(summary.get("KHS").unwrap(), "125.20");

    let threads = bundle.threads.expect("threads slot");
    assert_eq!(threads.len(), 2);
    assert_eq!(threads.get("CPU0").unwrap().get("H/s").unwrap(), "64000.00");
    assert_eq!(threads.get("CPU1").unwrap().get("H/s").unwrap(), "61250.00");

    let histo = bundle.histo.expect("histo slot");
    assert!(histo.is_empty());
}

#[test]
fn single_command_round_trip() {
    let (port, daemon) = spawn_daemon(1);
    let config = config_for(port);
    let mut stream = rigmon::connect(&config).expect("connect");
    stream.write_all(b"summary").expect("send command");
    let line = rigmon::read_line(&mut stream).expect("read line");
    daemon.join().expect("daemon thread");

    assert_eq!(line, SUMMARY_LINE);
    let records = rigmon::decode(&line);
    assert_eq!(records.len(), 1);
    assert_eq!(
        records.keys().next().expect("record name"),
        "NAMEcpuminer-opt"
    );
}

#[test]
fn unreachable_daemon_yields_empty_bundle() {
    // Bind then drop, so the port is known-closed.
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let bundle = fetch_all(&TcpTransport::new(config_for(port)));
    assert!(bundle.summary.is_none());
    assert!(bundle.threads.is_none());
    assert!(bundle.histo.is_none());
}

#[test]
fn partial_bundle_serializes_with_null_slots() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let bundle = fetch_all(&TcpTransport::new(config_for(port)));
    let json = serde_json::to_string(&bundle).expect("serialize bundle");
    assert_eq!(json, r#"{"summary":null,"threads":null,"histo":null}"#);
}
