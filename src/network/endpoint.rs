//! TCP destination
//!
//! Host + port pair. Resolution happens at connect time, so an unresolvable
//! host only fails when a request is actually issued.

use std::fmt;
use std::net::TcpStream;
use std::time::Duration;

use crate::error::{FetchError, Result};

/// Identifies a TCP destination
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Open a new connection, optionally bounded by `timeout`
    ///
    /// DNS failures and refused connections both map to `FetchError::Connect`.
    pub fn connect(&self, timeout: Option<Duration>) -> Result<TcpStream> {
        let connect_err = |source: std::io::Error| FetchError::Connect {
            endpoint: self.to_string(),
            source,
        };

        let Some(timeout) = timeout else {
            return TcpStream::connect((self.host.as_str(), self.port)).map_err(connect_err);
        };

        // connect_timeout takes a single resolved address; try each in turn
        let addrs = std::net::ToSocketAddrs::to_socket_addrs(&(self.host.as_str(), self.port))
            .map_err(connect_err)?;
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }
        Err(connect_err(last_err.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "host resolved to no addresses")
        })))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
