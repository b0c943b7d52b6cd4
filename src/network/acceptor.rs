//! Connection Acceptor
//!
//! Owns the listening socket and runs the accept loop on its own thread.
//! Each accepted connection goes straight to the dispatcher, so the loop
//! never waits on request processing. The loop has no exit condition and
//! there is no shutdown path: it runs until the process exits.
//!
//! ## Process-wide instance
//! `get_or_create` builds at most one acceptor per process, guarded by a
//! `OnceLock`. Later calls return that same instance, even when they pass a
//! different port. A failed bind still counts as created; `is_bound` and
//! `start` report the failure.

use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{FetchError, Result};
use crate::resolver::FileResolver;

use super::dispatch::Dispatcher;

static INSTANCE: OnceLock<Acceptor> = OnceLock::new();

/// TCP acceptor for linefetch
pub struct Acceptor {
    /// Server configuration shared with every handler
    config: Arc<Config>,

    /// Bound listener, or the reason binding failed
    listener: std::result::Result<TcpListener, String>,

    /// Accept loop thread, once started
    accept_thread: Mutex<Option<JoinHandle<()>>>,
}

impl Acceptor {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Return the process-wide acceptor, creating it on port `port` if needed
    ///
    /// The port is ignored once the instance exists.
    pub fn get_or_create(port: u16) -> &'static Acceptor {
        INSTANCE.get_or_init(|| {
            let config = Config::builder().listen_port(port).build();
            Self::create(config)
        })
    }

    /// Return the process-wide acceptor, creating it from `config` if needed
    ///
    /// The config is ignored once the instance exists.
    pub fn get_or_create_with(config: Config) -> &'static Acceptor {
        INSTANCE.get_or_init(move || Self::create(config))
    }

    /// Bind an independent acceptor, surfacing bind failure as an error
    pub fn bind(config: Config) -> Result<Self> {
        config.validate()?;
        let acceptor = Self::create(config);
        if let Err(reason) = &acceptor.listener {
            return Err(FetchError::Bind {
                addr: acceptor.config.listen_addr(),
                reason: reason.clone(),
            });
        }
        Ok(acceptor)
    }

    fn create(config: Config) -> Self {
        let addr = config.listen_addr();
        let listener = match TcpListener::bind(&addr) {
            Ok(listener) => {
                tracing::info!("Listening on {}", addr);
                Ok(listener)
            }
            Err(e) => {
                tracing::error!("Failed to bind {}: {}", addr, e);
                Err(e.to_string())
            }
        };

        Self {
            config: Arc::new(config),
            listener,
            accept_thread: Mutex::new(None),
        }
    }

    // =========================================================================
    // Accept loop
    // =========================================================================

    /// Start the accept loop on its own thread
    ///
    /// Calling `start` again after a successful start is a no-op.
    pub fn start(&self) -> Result<()> {
        let mut accept_thread = self.accept_thread.lock();
        if accept_thread.is_some() {
            return Ok(());
        }

        self.config.validate()?;
        let listener = self.listener()?.try_clone()?;
        let resolver = Arc::new(FileResolver::new(self.config.root_dir.clone()));
        let dispatcher = Dispatcher::new(Arc::clone(&self.config), resolver)?;

        let handle = thread::Builder::new()
            .name("linefetch-acceptor".to_string())
            .spawn(move || accept_loop(listener, dispatcher))?;

        *accept_thread = Some(handle);
        Ok(())
    }

    /// Block until the accept loop exits (it normally never does)
    pub fn wait(&self) {
        let handle = self.accept_thread.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("Accept loop panicked");
            }
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Whether the listening socket was bound successfully
    pub fn is_bound(&self) -> bool {
        self.listener.is_ok()
    }

    /// Whether the accept loop has been started
    pub fn is_running(&self) -> bool {
        self.accept_thread.lock().is_some()
    }

    /// Address actually bound (resolves port 0 to the ephemeral port)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener()?.local_addr()?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn listener(&self) -> Result<&TcpListener> {
        self.listener.as_ref().map_err(|reason| FetchError::Bind {
            addr: self.config.listen_addr(),
            reason: reason.clone(),
        })
    }
}

fn accept_loop(listener: TcpListener, dispatcher: Dispatcher) {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                tracing::trace!(
                    "Accepted connection from {}",
                    stream
                        .peer_addr()
                        .map(|a| a.to_string())
                        .unwrap_or_else(|_| "unknown".to_string())
                );
                dispatcher.dispatch(stream);
            }
            Err(e) => tracing::warn!("Accept failed: {}", e),
        }
    }
}
