//! Confirmed and pending ledger operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a transfer relative to the account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    /// Funds received by the account
    In,
    /// Funds sent from the account
    Out,
}

impl OperationType {
    /// Canonical identifier fragment ("IN" / "OUT")
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::In => "IN",
            OperationType::Out => "OUT",
        }
    }
}

/// A ledger transfer affecting the account, confirmed or pending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Globally unique per account: `<account_id>-<hash>-<IN|OUT>`
    pub id: String,
    /// Ledger transaction hash
    pub hash: String,
    /// Transfer direction
    pub kind: OperationType,
    /// Amount in drops; for `Out` this includes the fee
    pub value: u64,
    /// Fee paid in drops
    pub fee: u64,
    /// Source addresses
    pub senders: Vec<String>,
    /// Destination addresses
    pub recipients: Vec<String>,
    /// Close time of the containing ledger, or local time while pending
    pub date: DateTime<Utc>,
    /// Account sequence number of the transaction
    pub sequence: u64,
    /// Height of the containing ledger; `None` while pending
    pub block_height: Option<u64>,
}

impl Operation {
    /// Derive the stable operation identifier.
    ///
    /// Deterministic for the same inputs, so re-fetching the same ledger
    /// transaction always reconciles onto the same entry.
    pub fn operation_id(account_id: &str, hash: &str, kind: OperationType) -> String {
        format!("{}-{}-{}", account_id, hash, kind.as_str())
    }
}
