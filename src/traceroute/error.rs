//! Error types for traceroute runs

use thiserror::Error;

/// Errors that can occur while running the system traceroute.
///
/// Parsing itself never fails; these only cover launching and supervising
/// the external command.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The target cannot be passed to the command
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The command exited unsuccessfully
    ///
    /// Carries whatever the command wrote to stderr.
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// The command's output could not be decoded
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The overall timeout elapsed before the command finished
    #[error("Traceroute timed out")]
    Timeout,

    /// The run was cancelled by the caller
    #[error("Traceroute cancelled")]
    Cancelled,

    /// Spawning or talking to the command failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
