//! Reporter errors.

use thiserror::Error;

use crate::result::ResultError;

/// Errors surfaced while reporting.
///
/// Protocol violations come from the underlying [`crate::result`]
/// model; stream failures propagate uncaught, the reporter performs no
/// buffering or retry.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The driver violated the lifecycle protocol.
    #[error(transparent)]
    Protocol(#[from] ResultError),

    /// Writing to the output stream failed.
    #[error("failed to write report output: {0}")]
    Io(#[from] std::io::Error),
}
