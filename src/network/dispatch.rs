//! Connection dispatch
//!
//! Hands each accepted connection to its own request handler. The baseline
//! policy spawns one thread per connection with no cap; the bounded policy
//! feeds a fixed worker pool through a crossbeam channel and turns away
//! connections once the queue is full.

use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::thread;

use crossbeam::channel::{self, Sender, TrySendError};

use crate::config::{Config, DispatchPolicy};
use crate::error::Result;
use crate::resolver::FileResolver;

use super::connection::serve_connection;

/// Routes accepted connections to request handlers
pub enum Dispatcher {
    /// New thread per connection
    ThreadPerConnection {
        resolver: Arc<FileResolver>,
        config: Arc<Config>,
    },

    /// Bounded queue in front of `workers` long-lived threads
    Pool { queue: Sender<TcpStream> },
}

impl Dispatcher {
    /// Build the dispatcher described by `config.dispatch`
    ///
    /// For the bounded policy this starts the worker threads immediately.
    pub fn new(config: Arc<Config>, resolver: Arc<FileResolver>) -> Result<Self> {
        match config.dispatch {
            DispatchPolicy::ThreadPerConnection => {
                Ok(Dispatcher::ThreadPerConnection { resolver, config })
            }
            DispatchPolicy::Bounded { workers, backlog } => {
                let (tx, rx) = channel::bounded::<TcpStream>(backlog);

                for id in 0..workers {
                    let rx = rx.clone();
                    let resolver = Arc::clone(&resolver);
                    let config = Arc::clone(&config);
                    thread::Builder::new()
                        .name(format!("linefetch-worker-{}", id))
                        .spawn(move || {
                            for stream in rx.iter() {
                                serve_connection(stream, Arc::clone(&resolver), &config);
                            }
                        })?;
                }

                tracing::debug!("Started {} workers (backlog {})", workers, backlog);
                Ok(Dispatcher::Pool { queue: tx })
            }
        }
    }

    /// Hand off one accepted connection without waiting for it to be served
    pub fn dispatch(&self, stream: TcpStream) {
        match self {
            Dispatcher::ThreadPerConnection { resolver, config } => {
                let resolver = Arc::clone(resolver);
                let config = Arc::clone(config);
                let spawned = thread::Builder::new()
                    .name("linefetch-conn".to_string())
                    .spawn(move || serve_connection(stream, resolver, &config));

                if let Err(e) = spawned {
                    tracing::error!("Failed to spawn handler thread: {}", e);
                }
            }
            Dispatcher::Pool { queue } => match queue.try_send(stream) {
                Ok(()) => {}
                Err(TrySendError::Full(stream)) => {
                    tracing::warn!("Handler queue full, refusing connection");
                    refuse(&stream);
                }
                Err(TrySendError::Disconnected(stream)) => {
                    tracing::error!("All handler workers have exited, refusing connection");
                    refuse(&stream);
                }
            },
        }
    }
}

/// Close a connection that will not be served
fn refuse(stream: &TcpStream) {
    if let Err(e) = stream.shutdown(Shutdown::Both) {
        tracing::debug!("Close of refused connection failed: {}", e);
    }
}
