//! Error types for fetching and parsing the post feed.
//!
//! # Design
//! Two kinds only: the transport never produced a usable body, or it did and
//! the body has the wrong shape. The controller handles both the same way,
//! but hosts (and the C ABI) still get to tell them apart.

use thiserror::Error;

/// The request did not yield a 2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status. `body` is kept for logs
    /// and left out of the message, which ends up in front of the user.
    #[error("HTTP {status}")]
    Status { status: u16, body: String },

    /// The transport gave up waiting.
    #[error("request timed out")]
    Timeout,

    /// No response at all: DNS, refused connection, TLS, broken stream.
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Errors surfaced by `PostsClient::parse_posts` and the controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The body arrived but is not an array of well-formed posts.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl FetchError {
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }
}
