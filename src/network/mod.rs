//! Network Module
//!
//! TCP client and server handling.
//!
//! ## Architecture
//! - Client: one fresh connection per request, read until peer close
//! - Server: single acceptor thread, one request handler per connection
//! - Handlers dispatched per `DispatchPolicy` (unbounded threads or a worker pool)

mod endpoint;
mod client;
mod connection;
mod dispatch;
mod acceptor;

pub use endpoint::Endpoint;
pub use client::Client;
pub use connection::{serve_connection, Connection, Outcome};
pub use dispatch::Dispatcher;
pub use acceptor::Acceptor;
