//! The `error` module defines the error taxonomy shared by both roles.
//!
//! Every failure the delivery loops can observe is one of these variants.
//! Only configuration problems are allowed to stop the process; everything
//! else is turned into a log line and a backoff pause by the loop that hit it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed node list or credentials. Fatal, raised before any connection attempt.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The configuration sources themselves could not be read or deserialized.
    #[error("failed to load settings: {0}")]
    Settings(#[from] config::ConfigError),

    /// A single node refused or timed out. The next candidate is tried.
    #[error("{0}")]
    ConnectFailure(String),

    /// Every candidate failed during one pass over the node list.
    #[error("could not connect to any broker node ({attempted} tried)")]
    NoReachableNode { attempted: usize },

    /// Declaring or binding the queue/exchange failed, usually a parameter conflict.
    #[error("topology error: {0}")]
    Topology(String),

    /// The live connection or channel broke during publish, consume or ack.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// A delivered body could not be parsed as a request.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true for failures that must abort the process instead of being retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::Settings(_))
    }

    /// Returns true when the session that produced this error can no longer be trusted.
    pub fn invalidates_session(&self) -> bool {
        matches!(
            self,
            Error::ConnectFailure(_)
                | Error::NoReachableNode { .. }
                | Error::Topology(_)
                | Error::ConnectionLost(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
