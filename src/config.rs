//! Configuration for linefetch
//!
//! Centralized configuration with sensible defaults. One `Config` carries both
//! the server side (listen address, resource root, dispatch) and the client side
//! (proxy address, identity); each component reads only the fields it needs.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{FetchError, Result};

/// Default port the file server listens on
pub const DEFAULT_SERVER_PORT: u16 = 8175;

/// Default port the client connects to
pub const DEFAULT_PROXY_PORT: u16 = 4665;

/// Default port for the pattern grammar variant
pub const DEFAULT_PATTERN_PORT: u16 = 7493;

/// Logical read chunk size for the byte accumulator
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Main configuration for a linefetch client or server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Server Configuration
    // -------------------------------------------------------------------------
    /// Host the acceptor binds to
    pub listen_host: String,

    /// Port the acceptor binds to (0 picks an ephemeral port)
    pub listen_port: u16,

    /// Directory that relative resource paths resolve against
    pub root_dir: PathBuf,

    /// How accepted connections are handed to request handlers
    pub dispatch: DispatchPolicy,

    /// Longest request line content the handler accepts (in bytes, terminator excluded)
    pub max_request_line: usize,

    // -------------------------------------------------------------------------
    // Client Configuration
    // -------------------------------------------------------------------------
    /// Host the client connects to
    pub proxy_host: String,

    /// Port the client connects to
    pub proxy_port: u16,

    /// Origin host sent as the first field of file-fetch requests
    pub identity: String,

    // -------------------------------------------------------------------------
    // Socket Configuration (shared)
    // -------------------------------------------------------------------------
    /// Read timeout (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,

    /// Chunk size used when accumulating a response
    pub chunk_size: usize,
}

/// Connection dispatch policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// Spawn a new thread for every accepted connection, no cap
    ThreadPerConnection,

    /// Fixed pool of worker threads fed through a bounded queue.
    /// Connections arriving while `backlog` are already waiting get closed.
    Bounded { workers: usize, backlog: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_host: "0.0.0.0".to_string(),
            listen_port: DEFAULT_SERVER_PORT,
            root_dir: PathBuf::from("."),
            dispatch: DispatchPolicy::ThreadPerConnection,
            max_request_line: 8 * 1024,
            proxy_host: "127.0.0.1".to_string(),
            proxy_port: DEFAULT_PROXY_PORT,
            identity: "localhost".to_string(),
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Read timeout as a socket option value
    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_ms > 0).then(|| Duration::from_millis(self.read_timeout_ms))
    }

    /// Write timeout as a socket option value
    pub fn write_timeout(&self) -> Option<Duration> {
        (self.write_timeout_ms > 0).then(|| Duration::from_millis(self.write_timeout_ms))
    }

    /// `host:port` string the acceptor binds to
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_host, self.listen_port)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(FetchError::Config("chunk_size must be non-zero".to_string()));
        }
        if self.max_request_line == 0 {
            return Err(FetchError::Config(
                "max_request_line must be non-zero".to_string(),
            ));
        }
        if let DispatchPolicy::Bounded { workers, .. } = self.dispatch {
            if workers == 0 {
                return Err(FetchError::Config(
                    "bounded dispatch needs at least one worker".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the host to bind
    pub fn listen_host(mut self, host: impl Into<String>) -> Self {
        self.config.listen_host = host.into();
        self
    }

    /// Set the port to bind
    pub fn listen_port(mut self, port: u16) -> Self {
        self.config.listen_port = port;
        self
    }

    /// Set the resource root directory
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.root_dir = path.into();
        self
    }

    /// Set the connection dispatch policy
    pub fn dispatch(mut self, policy: DispatchPolicy) -> Self {
        self.config.dispatch = policy;
        self
    }

    /// Set the request line limit (in bytes, terminator excluded)
    pub fn max_request_line(mut self, bytes: usize) -> Self {
        self.config.max_request_line = bytes;
        self
    }

    /// Set the host the client connects to
    pub fn proxy_host(mut self, host: impl Into<String>) -> Self {
        self.config.proxy_host = host.into();
        self
    }

    /// Set the port the client connects to
    pub fn proxy_port(mut self, port: u16) -> Self {
        self.config.proxy_port = port;
        self
    }

    /// Set the origin host sent in file-fetch requests
    pub fn identity(mut self, identity: impl Into<String>) -> Self {
        self.config.identity = identity.into();
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the accumulator chunk size (in bytes)
    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.config.chunk_size = bytes;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
