//! Request Handler
//!
//! Handles one accepted connection: decode a single file-fetch request,
//! resolve it, stream the bytes back, close. Steps run strictly in that
//! order and the connection is never reused.

use std::io::{BufReader, BufWriter, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::protocol::read_request_line;
use crate::resolver::FileResolver;

/// What a handler did with its connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Resource found; `bytes` were written before close
    Served { bytes: usize },

    /// Resource absent; the connection was closed with nothing written
    Absent,
}

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for line decoding)
    reader: BufReader<TcpStream>,

    /// TCP stream writer
    writer: BufWriter<TcpStream>,

    /// Resolves request paths to file contents
    resolver: Arc<FileResolver>,

    /// Longest request line accepted
    max_request_line: usize,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O and applies the configured socket timeouts.
    pub fn new(stream: TcpStream, resolver: Arc<FileResolver>, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            resolver,
            max_request_line: config.max_request_line,
            peer_addr,
        })
    }

    /// Decode, resolve and respond, then close
    ///
    /// The connection is closed on every path, including errors.
    pub fn handle(mut self) -> Result<Outcome> {
        let result = self.serve();
        self.close();
        result
    }

    fn serve(&mut self) -> Result<Outcome> {
        let (origin_host, resource_path) =
            read_request_line(&mut self.reader, self.max_request_line)?;

        tracing::debug!(
            "Request from {} (origin {}): {}",
            self.peer_addr,
            origin_host,
            resource_path
        );

        let Some(contents) = self.resolver.resolve(&resource_path)? else {
            tracing::info!("{} requested absent resource {}", self.peer_addr, resource_path);
            return Ok(Outcome::Absent);
        };

        self.writer.write_all(&contents)?;
        self.writer.flush()?;

        tracing::info!(
            "Served {} bytes of {} to {}",
            contents.len(),
            resource_path,
            self.peer_addr
        );
        Ok(Outcome::Served {
            bytes: contents.len(),
        })
    }

    /// Best-effort close; failures are reported, never propagated
    fn close(&mut self) {
        if let Err(e) = self.writer.flush() {
            tracing::debug!("Flush before close failed for {}: {}", self.peer_addr, e);
        }
        if let Err(e) = self.writer.get_ref().shutdown(Shutdown::Both) {
            tracing::debug!("Close failed for {}: {}", self.peer_addr, e);
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

/// Run a handler for `stream`, containing every failure to this connection
pub fn serve_connection(stream: TcpStream, resolver: Arc<FileResolver>, config: &Config) {
    let connection = match Connection::new(stream, resolver, config) {
        Ok(connection) => connection,
        Err(e) => {
            tracing::warn!("Failed to set up connection: {}", e);
            return;
        }
    };

    let peer_addr = connection.peer_addr().to_string();
    match connection.handle() {
        Ok(outcome) => tracing::trace!("Connection {} finished: {:?}", peer_addr, outcome),
        Err(e) if e.is_disconnect() => {
            tracing::debug!("Client {} disconnected early: {}", peer_addr, e);
        }
        Err(e) => tracing::warn!("Error handling {}: {}", peer_addr, e),
    }
}
