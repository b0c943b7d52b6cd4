//! # linefetch
//!
//! A minimal request/response protocol exerciser:
//! - Client that sends one line-based request per TCP connection
//! - Response read until the server closes the connection
//! - Thread-per-connection file server behind a process-wide acceptor
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐   "<origin> <path> \r\n\r\n"   ┌──────────────────────┐
//! │    Client    │ ─────────────────────────────▶ │  Connection Acceptor │
//! │ (accumulate  │                                │   (accept thread)    │
//! │  until EOF)  │                                └──────────┬───────────┘
//! └──────▲───────┘                                           │ dispatch
//!        │                                                   ▼
//!        │          raw bytes, then close          ┌──────────────────────┐
//!        └──────────────────────────────────────── │   Request Handler    │
//!                                                  │  (one per connection)│
//!                                                  └──────────┬───────────┘
//!                                                             │
//!                                                             ▼
//!                                                  ┌──────────────────────┐
//!                                                  │  Resource Resolver   │
//!                                                  │  (path → file bytes) │
//!                                                  └──────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod accumulator;
pub mod protocol;
pub mod resolver;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{FetchError, Result};
pub use config::{Config, DispatchPolicy};
pub use network::{Acceptor, Client, Endpoint};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of linefetch
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
