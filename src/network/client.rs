//! Protocol Client
//!
//! One TCP connection per request: connect, write the encoded request, read
//! until the server closes, close. No connection reuse and no concurrency
//! inside a single client; a driver that wants N requests calls N times.

use std::io::BufWriter;
use std::net::{Shutdown, TcpStream};

use bytes::Bytes;

use crate::accumulator::read_to_end_chunked;
use crate::config::Config;
use crate::error::Result;
use crate::protocol::{write_request, Request};

use super::Endpoint;

/// Client for the line-based fetch protocol
#[derive(Debug, Clone)]
pub struct Client {
    /// Where every request is sent
    endpoint: Endpoint,

    /// Origin host sent as the first field of file-fetch requests
    identity: String,

    /// Socket and accumulator settings
    config: Config,
}

impl Client {
    /// Create a client; performs no I/O
    pub fn new(endpoint: Endpoint, identity: impl Into<String>) -> Self {
        Self {
            endpoint,
            identity: identity.into(),
            config: Config::default(),
        }
    }

    /// Create a client from the proxy/identity/timeout fields of `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            endpoint: Endpoint::new(config.proxy_host.clone(), config.proxy_port),
            identity: config.identity.clone(),
            config: config.clone(),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    // =========================================================================
    // Logging wrappers
    // =========================================================================

    /// Fetch a resource and return it as text
    ///
    /// Failures are logged and reported as `None`; nothing is retried.
    pub fn fetch(&self, resource_path: &str) -> Option<String> {
        let request = Request::file_fetch(self.identity.clone(), resource_path);
        self.exchange_logged(&request)
    }

    /// Send a pattern request and return the response as text
    ///
    /// Failures are logged and reported as `None`; nothing is retried.
    pub fn fetch_pattern(&self, pattern: &str, count: &str) -> Option<String> {
        let request = Request::pattern(pattern, count);
        self.exchange_logged(&request)
    }

    // =========================================================================
    // Raw operations
    // =========================================================================

    /// Fetch a resource and return the raw response bytes
    pub fn fetch_bytes(&self, resource_path: &str) -> Result<Bytes> {
        self.exchange(&Request::file_fetch(self.identity.clone(), resource_path))
    }

    /// Send a pattern request and return the raw response bytes
    pub fn fetch_pattern_bytes(&self, pattern: &str, count: &str) -> Result<Bytes> {
        self.exchange(&Request::pattern(pattern, count))
    }

    /// Run one full request/response exchange on a fresh connection
    pub fn exchange(&self, request: &Request) -> Result<Bytes> {
        // Connecting is bounded by the write timeout
        let stream = self.endpoint.connect(self.config.write_timeout())?;
        stream.set_read_timeout(self.config.read_timeout())?;
        stream.set_write_timeout(self.config.write_timeout())?;

        tracing::debug!("Connected to {}", self.endpoint);

        let mut writer = BufWriter::new(stream.try_clone()?);
        write_request(&mut writer, request)?;
        drop(writer);

        let mut reader = stream;
        let response = read_to_end_chunked(&mut reader, self.config.chunk_size)?;

        close_quietly(&reader);
        Ok(response)
    }

    fn exchange_logged(&self, request: &Request) -> Option<String> {
        tracing::info!("Sending {:?} to {}", request, self.endpoint);

        match self.exchange(request) {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                tracing::info!("Received {} bytes from {}", bytes.len(), self.endpoint);
                tracing::debug!("Response body: {}", text);
                Some(text)
            }
            Err(e) => {
                tracing::warn!("Request to {} failed: {}", self.endpoint, e);
                None
            }
        }
    }
}

/// Best-effort close; the server has normally shut down its side already.
fn close_quietly(stream: &TcpStream) {
    if let Err(e) = stream.shutdown(Shutdown::Both) {
        tracing::trace!("Shutdown after response: {}", e);
    }
}
