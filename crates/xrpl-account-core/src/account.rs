//! Account model and deterministic identifiers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::derivation::DerivationMode;
use crate::operation::Operation;

/// A single ledger account held by the signing device.
///
/// Owned exclusively by the caller; the engine never mutates a shared
/// account, it emits [`crate::patch::AccountPatch`] commands the caller
/// applies to whatever snapshot it currently holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Stable identifier, never regenerated differently for the same inputs
    pub id: String,
    /// Current receive address
    pub fresh_address: String,
    /// Derivation path of `fresh_address`
    pub fresh_address_path: String,
    /// Balance in drops
    pub balance: u64,
    /// Last synchronized validated-ledger height
    pub block_height: u64,
    /// Confirmed history, date-descending
    pub operations: Vec<Operation>,
    /// Locally-known operations not yet confirmed on the ledger
    pub pending_operations: Vec<Operation>,
    /// Completion time of the last sync pass
    pub last_sync: DateTime<Utc>,
}

impl Account {
    /// Derive the stable account identifier from currency, address and
    /// derivation mode.
    pub fn account_id(currency_id: &str, address: &str, mode: DerivationMode) -> String {
        format!("{}:{}:{}", currency_id, address, mode.key())
    }

    /// Empty account emitted by discovery for an address with no ledger
    /// entry yet: zero balance, no history.
    pub fn placeholder(
        currency_id: &str,
        address: String,
        path: String,
        mode: DerivationMode,
    ) -> Self {
        Self {
            id: Self::account_id(currency_id, &address, mode),
            fresh_address: address,
            fresh_address_path: path,
            balance: 0,
            block_height: 0,
            operations: Vec::new(),
            pending_operations: Vec::new(),
            last_sync: Utc::now(),
        }
    }

    /// Ledger height to resume history fetching from.
    ///
    /// An empty confirmed history re-pulls from height 0 rather than
    /// trusting a possibly stale height bookmark.
    pub fn sync_floor(&self) -> u64 {
        if self.operations.is_empty() {
            0
        } else {
            self.block_height
        }
    }
}
