//! Client Tests
//!
//! Exercises the client against hand-rolled peers so the exact bytes on the
//! wire and the end-of-response behavior can be observed.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use crossbeam::channel;
use linefetch::{Client, Config, Endpoint, FetchError};

// =============================================================================
// Helper Functions
// =============================================================================

fn local_listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// Read the request line and the blank line that follows, returning the raw text
fn read_raw_request(stream: &TcpStream) -> String {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut raw = String::new();
    reader.read_line(&mut raw).unwrap();
    reader.read_line(&mut raw).unwrap();
    raw
}

/// A port nothing is listening on
fn closed_port() -> u16 {
    let (listener, port) = local_listener();
    drop(listener);
    port
}

// =============================================================================
// Wire Format Tests
// =============================================================================

#[test]
fn test_fetch_sends_file_fetch_grammar() {
    let (listener, port) = local_listener();
    let peer = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let raw = read_raw_request(&stream);
        stream.write_all(b"payload").unwrap();
        raw
    });

    let client = Client::new(Endpoint::new("127.0.0.1", port), "originA");
    assert_eq!(client.fetch("/tmp/x").as_deref(), Some("payload"));
    assert_eq!(peer.join().unwrap(), "originA /tmp/x \r\n\r\n");
}

#[test]
fn test_fetch_pattern_sends_pattern_grammar_without_identity() {
    let (listener, port) = local_listener();
    let peer = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let raw = read_raw_request(&stream);
        stream.write_all(b"ababab").unwrap();
        raw
    });

    let client = Client::new(Endpoint::new("127.0.0.1", port), "originA");
    assert_eq!(client.fetch_pattern("ab", "3").as_deref(), Some("ababab"));
    assert_eq!(peer.join().unwrap(), "ab 3\r\n\r\n");
}

#[test]
fn test_response_delivered_in_pieces_is_accumulated() {
    let (listener, port) = local_listener();
    let peer = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        read_raw_request(&stream);
        for piece in [&b"one "[..], &b"two "[..], &b""[..], &b"three"[..]] {
            stream.write_all(piece).unwrap();
            stream.flush().unwrap();
            thread::sleep(Duration::from_millis(20));
        }
    });

    let client = Client::new(Endpoint::new("127.0.0.1", port), "o");
    let bytes = client.fetch_bytes("x").unwrap();
    assert_eq!(&bytes[..], b"one two three");
    peer.join().unwrap();
}

#[test]
fn test_non_utf8_response_is_lossy_text() {
    let (listener, port) = local_listener();
    let peer = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        read_raw_request(&stream);
        stream.write_all(&[b'o', b'k', 0xFF]).unwrap();
    });

    let client = Client::new(Endpoint::new("127.0.0.1", port), "o");
    assert_eq!(client.fetch("x").as_deref(), Some("ok\u{FFFD}"));
    peer.join().unwrap();
}

#[test]
fn test_each_request_opens_its_own_connection() {
    let (listener, port) = local_listener();
    let peer = thread::spawn(move || {
        let mut seen = Vec::new();
        for i in 0..3 {
            let (mut stream, _) = listener.accept().unwrap();
            seen.push(read_raw_request(&stream));
            stream.write_all(format!("r{}", i).as_bytes()).unwrap();
        }
        seen
    });

    let client = Client::new(Endpoint::new("127.0.0.1", port), "me");
    assert_eq!(client.fetch("a").as_deref(), Some("r0"));
    assert_eq!(client.fetch("b").as_deref(), Some("r1"));
    assert_eq!(client.fetch("c").as_deref(), Some("r2"));

    let seen = peer.join().unwrap();
    assert_eq!(seen, vec!["me a \r\n\r\n", "me b \r\n\r\n", "me c \r\n\r\n"]);
}

// =============================================================================
// Failure Handling Tests
// =============================================================================

#[test]
fn test_connection_refused_is_contained() {
    let client = Client::new(Endpoint::new("127.0.0.1", closed_port()), "o");

    assert!(client.fetch("x").is_none());
    assert!(client.fetch_pattern("p", "1").is_none());
    assert!(matches!(
        client.fetch_bytes("x"),
        Err(FetchError::Connect { .. })
    ));
}

#[test]
fn test_unresolvable_host_is_contained() {
    let client = Client::new(Endpoint::new("host.invalid", 4665), "o");

    assert!(client.fetch("x").is_none());
    assert!(matches!(
        client.fetch_bytes("x"),
        Err(FetchError::Connect { .. })
    ));
}

#[test]
fn test_failed_request_does_not_abort_batch() {
    let (listener, port) = local_listener();
    let peer = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        read_raw_request(&stream);
        stream.write_all(b"alive").unwrap();
    });

    let dead = Client::new(Endpoint::new("127.0.0.1", closed_port()), "o");
    let live = Client::new(Endpoint::new("127.0.0.1", port), "o");

    let results: Vec<Option<String>> = vec![dead.fetch("a"), live.fetch("b"), dead.fetch("c")];
    assert_eq!(results, vec![None, Some("alive".to_string()), None]);
    peer.join().unwrap();
}

// =============================================================================
// End-of-Response Tests
// =============================================================================

/// Without a read timeout the client waits for the peer to close, however long
/// that takes. This is the baseline behavior, not a bug.
#[test]
fn test_read_blocks_until_peer_closes() {
    let (listener, port) = local_listener();
    let (accepted_tx, accepted_rx) = channel::bounded::<TcpStream>(1);
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        read_raw_request(&stream);
        stream.write_all(b"partial").unwrap();
        accepted_tx.send(stream).unwrap();
    });

    let (result_tx, result_rx) = channel::bounded(1);
    thread::spawn(move || {
        let client = Client::new(Endpoint::new("127.0.0.1", port), "o");
        result_tx.send(client.fetch_bytes("x")).unwrap();
    });

    let server_side = accepted_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    // Data has arrived but the write side is still open: no result yet
    assert!(result_rx.recv_timeout(Duration::from_millis(500)).is_err());

    drop(server_side);
    let bytes = result_rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap();
    assert_eq!(&bytes[..], b"partial");
}

#[test]
fn test_read_timeout_bounds_the_wait() {
    let (listener, port) = local_listener();
    let (hold_tx, hold_rx) = channel::bounded::<TcpStream>(1);
    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        read_raw_request(&stream);
        hold_tx.send(stream).unwrap();
    });

    let config = Config::builder()
        .proxy_host("127.0.0.1")
        .proxy_port(port)
        .read_timeout_ms(200)
        .build();
    let client = Client::from_config(&config).unwrap();

    let result = client.fetch_bytes("x");
    match result {
        Err(FetchError::Io(e)) => assert!(matches!(
            e.kind(),
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
        )),
        other => panic!("Expected timeout, got {:?}", other),
    }
    drop(hold_rx);
}

#[test]
fn test_from_config_uses_proxy_fields() {
    let config = Config::builder()
        .proxy_host("proxy.local")
        .proxy_port(9999)
        .identity("me")
        .build();
    let client = Client::from_config(&config).unwrap();

    assert_eq!(client.endpoint(), &Endpoint::new("proxy.local", 9999));
    assert_eq!(client.identity(), "me");
}

#[test]
fn test_from_config_rejects_zero_chunk_size() {
    let config = Config::builder().chunk_size(0).build();
    assert!(matches!(
        Client::from_config(&config),
        Err(FetchError::Config(_))
    ));
}
