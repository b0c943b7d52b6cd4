//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### File-fetch request
//! ```text
//! <originHost> SP <resourcePath> SP CR LF CR LF
//! ```
//!
//! ### Pattern request
//! ```text
//! <pattern> SP <count> CR LF CR LF
//! ```
//!
//! Fields are not escaped: a field containing whitespace splits into extra
//! tokens on the server, which only keeps the first two.

use std::io::{BufRead, Read, Write};

use bytes::Bytes;

use super::{Grammar, Request};
use crate::error::{FetchError, Result};

/// Line terminator followed by the empty second line
pub const REQUEST_TERMINATOR: &str = "\r\n\r\n";

// =============================================================================
// Request Encoding
// =============================================================================

/// Encode a file-fetch request
///
/// Format: `"{origin_host} {resource_path} \r\n\r\n"` (note the trailing space)
pub fn encode_file_fetch(origin_host: &str, resource_path: &str) -> Bytes {
    Bytes::from(format!(
        "{} {} {}",
        origin_host, resource_path, REQUEST_TERMINATOR
    ))
}

/// Encode a pattern request
///
/// Format: `"{pattern} {count}\r\n\r\n"`
pub fn encode_pattern(pattern: &str, count: &str) -> Bytes {
    Bytes::from(format!("{} {}{}", pattern, count, REQUEST_TERMINATOR))
}

/// Encode a request using its own grammar
pub fn encode_request(request: &Request) -> Bytes {
    match request {
        Request::FileFetch {
            origin_host,
            resource_path,
        } => encode_file_fetch(origin_host, resource_path),
        Request::Pattern { pattern, count } => encode_pattern(pattern, count),
    }
}

// =============================================================================
// Request Decoding
// =============================================================================

/// Split a request line into its first two whitespace-delimited tokens
///
/// Extra tokens are ignored. Fewer than two tokens is a malformed request.
pub fn decode_request_line(line: &str) -> Result<(String, String)> {
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(first), Some(second)) => Ok((first.to_string(), second.to_string())),
        _ => Err(FetchError::MalformedRequest(format!(
            "expected two tokens, got {:?}",
            line.trim_end()
        ))),
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one request line from a buffered stream and split it into two tokens
///
/// Decodes the request line first, so a malformed line fails without waiting
/// for more input. On success the following line is consumed and discarded.
/// Lines whose content (excluding the line terminator) exceeds `max_line`
/// bytes are rejected with `RequestTooLong`.
pub fn read_request_line<R: BufRead>(reader: &mut R, max_line: usize) -> Result<(String, String)> {
    let line = read_line_limited(reader, max_line)?;
    let tokens = decode_request_line(&line)?;
    let _ = read_line_limited(reader, max_line)?;

    Ok(tokens)
}

/// Read one request in the given grammar
pub fn read_request<R: BufRead>(reader: &mut R, grammar: Grammar, max_line: usize) -> Result<Request> {
    let (first, second) = read_request_line(reader, max_line)?;
    Ok(Request::from_tokens(grammar, first, second))
}

/// Write a request to a stream and flush it
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    let bytes = encode_request(request);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a single `\n`-terminated line with at most `max_line` content bytes.
/// The `\r\n` terminator is stripped and not counted against the limit.
/// End-of-stream before a newline returns whatever was read.
fn read_line_limited<R: BufRead>(reader: &mut R, max_line: usize) -> Result<String> {
    let mut raw = Vec::new();
    let limit = max_line as u64 + 2;
    reader.by_ref().take(limit).read_until(b'\n', &mut raw)?;

    if raw.last() == Some(&b'\n') {
        raw.pop();
    }
    if raw.last() == Some(&b'\r') {
        raw.pop();
    }
    if raw.len() > max_line {
        return Err(FetchError::RequestTooLong { limit: max_line });
    }

    String::from_utf8(raw)
        .map_err(|_| FetchError::MalformedRequest("request line is not valid UTF-8".to_string()))
}
