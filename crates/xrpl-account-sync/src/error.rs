//! Error types for discovery, sync, and the transaction lifecycle

use thiserror::Error;

/// Result type used throughout the sync crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the network and device layers
#[derive(Error, Debug)]
pub enum Error {
    /// Transport or node error while talking to the ledger
    #[error("Network error: {0}")]
    Network(String),

    /// The requested account does not exist on the ledger
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Hardware signing device refused or failed the request
    #[error("Device error: {0}")]
    Device(String),

    /// The node accepted the submission request but reported a
    /// non-success engine result
    #[error("Submission failed ({code}): {message}")]
    Submission {
        /// Engine result code reported by the node
        code: String,
        /// Human-readable message accompanying the result code
        message: String,
    },

    /// The operation was cancelled before it completed
    #[error("Operation cancelled")]
    Cancelled,

    /// Validation or data-model error from the core crate
    #[error(transparent)]
    Core(#[from] xrpl_account_core::Error),
}

impl Error {
    /// Whether the error stems from user input rather than the
    /// infrastructure. User errors are shown as-is and never retried.
    pub fn is_user_error(&self) -> bool {
        match self {
            Error::Core(core) => core.is_user_error(),
            _ => false,
        }
    }
}
