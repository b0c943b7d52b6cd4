//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format
//!
//! ### Request Format
//! Two whitespace-separated tokens on one line, then an empty line:
//! ```text
//! ┌──────────┬────┬──────────┬─────────────┬──────────┐
//! │ Field 1  │ SP │ Field 2  │ [SP] CR LF  │  CR LF   │
//! └──────────┴────┴──────────┴─────────────┴──────────┘
//! ```
//!
//! ### Grammars
//! - File fetch: origin host + resource path (trailing space before CR LF)
//! - Pattern:    pattern + count
//!
//! ### Response Format
//! Raw bytes of the resource with no length prefix. The server closing the
//! connection marks the end of the response; an absent resource yields zero
//! bytes.

mod request;
mod codec;

pub use request::{Grammar, Request};
pub use codec::{
    decode_request_line, encode_file_fetch, encode_pattern, encode_request, read_request,
    read_request_line, write_request, REQUEST_TERMINATOR,
};
