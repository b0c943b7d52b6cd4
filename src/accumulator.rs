//! Byte Accumulator
//!
//! Reads a stream in fixed-size chunks until end-of-stream and returns
//! everything that arrived, in order. The response grammar has no length
//! field, so peer close is the only end-of-response signal: callers block
//! here until the other side shuts down its write half (or a socket timeout
//! fires, if one was configured).

use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};

use crate::config::DEFAULT_CHUNK_SIZE;
use crate::error::Result;

/// Read until end-of-stream using the default 1024-byte chunk
pub fn read_to_end<R: Read>(reader: &mut R) -> Result<Bytes> {
    read_to_end_chunked(reader, DEFAULT_CHUNK_SIZE)
}

/// Read until end-of-stream, `chunk_size` bytes at a time
///
/// `Interrupted` reads are retried; any other error is returned and the
/// partial buffer is discarded.
pub fn read_to_end_chunked<R: Read>(reader: &mut R, chunk_size: usize) -> Result<Bytes> {
    let chunk_size = chunk_size.max(1);
    let mut chunk = vec![0u8; chunk_size];
    let mut buffer = BytesMut::with_capacity(chunk_size);

    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    tracing::trace!("Accumulated {} bytes", buffer.len());
    Ok(buffer.freeze())
}
