//! Tagged sync events applied by the caller
//!
//! The sync engine never mutates an account; it emits patch commands the
//! caller folds into whatever snapshot it currently holds via [`apply`].
//! Patches must be applied in emission order within one account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::operation::Operation;

/// One step of an incremental sync pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AccountPatch {
    /// On-ledger balance and synchronized height changed
    BalanceUpdated {
        /// New balance in drops
        balance: u64,
        /// Validated-ledger height the balance was read at
        block_height: u64,
    },
    /// Confirmed history was merged and pending operations reconciled
    OperationsMerged {
        /// New confirmed history, date-descending
        operations: Vec<Operation>,
        /// Pending operations that survived reconciliation
        pending_operations: Vec<Operation>,
        /// Completion time of the sync pass
        last_sync: DateTime<Utc>,
    },
}

/// Pure reducer folding one patch into an account snapshot.
pub fn apply(mut account: Account, patch: AccountPatch) -> Account {
    match patch {
        AccountPatch::BalanceUpdated {
            balance,
            block_height,
        } => {
            account.balance = balance;
            account.block_height = block_height;
        }
        AccountPatch::OperationsMerged {
            operations,
            pending_operations,
            last_sync,
        } => {
            account.operations = operations;
            account.pending_operations = pending_operations;
            account.last_sync = last_sync;
        }
    }
    account
}
