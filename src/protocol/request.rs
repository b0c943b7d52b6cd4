//! Request definitions
//!
//! Represents the two request grammars a client can send.

/// Request grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// `<originHost> <resourcePath> \r\n\r\n`
    FileFetch,
    /// `<pattern> <count>\r\n\r\n`
    Pattern,
}

/// A structured request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Fetch a file from the server's resource root
    FileFetch {
        origin_host: String,
        resource_path: String,
    },

    /// Pattern request; `count` travels as text and is not validated
    Pattern { pattern: String, count: String },
}

impl Request {
    /// Build a file-fetch request
    pub fn file_fetch(origin_host: impl Into<String>, resource_path: impl Into<String>) -> Self {
        Request::FileFetch {
            origin_host: origin_host.into(),
            resource_path: resource_path.into(),
        }
    }

    /// Build a pattern request
    pub fn pattern(pattern: impl Into<String>, count: impl Into<String>) -> Self {
        Request::Pattern {
            pattern: pattern.into(),
            count: count.into(),
        }
    }

    /// Get the request grammar
    pub fn grammar(&self) -> Grammar {
        match self {
            Request::FileFetch { .. } => Grammar::FileFetch,
            Request::Pattern { .. } => Grammar::Pattern,
        }
    }

    /// Rebuild a request from the two tokens of a decoded request line
    pub fn from_tokens(grammar: Grammar, first: String, second: String) -> Self {
        match grammar {
            Grammar::FileFetch => Request::FileFetch {
                origin_host: first,
                resource_path: second,
            },
            Grammar::Pattern => Request::Pattern {
                pattern: first,
                count: second,
            },
        }
    }
}
