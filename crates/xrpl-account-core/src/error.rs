//! Error types for the account model
//!
//! Business-rule failures carry enough structured data for the caller to
//! render an actionable message (e.g. the minimum amount that would create
//! the destination account).

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Account model errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transaction has no fee yet; network enrichment has not run.
    #[error("Fee is not loaded")]
    FeeNotLoaded,

    /// Address fails syntactic validation
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Invalid destination tag
    #[error("Invalid destination tag: {0}")]
    InvalidTag(String),

    /// Sending this amount would leave the destination below the reserve
    /// needed to create it on the ledger.
    #[error("Destination would not be created: minimum {minimum} drops required")]
    DestinationNotCreated {
        /// Minimum amount in drops that would fund the destination.
        minimum: u64,
    },

    /// Amount plus fee plus reserve exceeds the account balance
    #[error("Insufficient balance: {required} drops required, {available} available")]
    InsufficientBalance {
        /// Total drops the transaction needs, reserve included.
        required: u64,
        /// Drops currently held by the account.
        available: u64,
    },

    /// Ledger reported a balance the model cannot represent
    #[error("Invalid balance: {0}")]
    InvalidBalance(String),
}

impl Error {
    /// Check if error is a user-facing error (vs data-integrity error)
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Error::InvalidBalance(_))
    }
}
