//! In-flight transaction drafting
//!
//! A draft starts empty, its fields are edited independently, and network
//! enrichment attaches a fee recommendation. Invalid edits are rejected by
//! the mutator, never silently coerced.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Snapshot of the ledger-wide fee recommendation attached to a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    /// Recommended base fee in drops
    pub base_fee: u64,
    /// Reserve required to create an account, in drops
    pub base_reserve: u64,
}

/// Fee display unit; presentation metadata only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeUnit {
    /// Drops (1e-6 XRP)
    #[default]
    Drops,
    /// Whole XRP
    Xrp,
}

/// Mutable in-flight payment being drafted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionDraft {
    /// Amount to send, in drops
    pub amount: u64,
    /// Destination classic address
    pub recipient: String,
    /// Fee in drops; `None` until enriched or explicitly set
    pub fee: Option<u64>,
    /// Destination tag
    pub tag: Option<u32>,
    /// Fee display unit
    pub fee_unit: FeeUnit,
    /// Fee recommendation attached by network enrichment
    pub network_info: Option<NetworkInfo>,
}

impl TransactionDraft {
    /// Create an empty draft
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the amount to send. Zero is rejected.
    pub fn set_amount(&mut self, amount: u64) -> Result<()> {
        if amount == 0 {
            return Err(Error::InvalidAmount("amount cannot be zero".to_string()));
        }
        self.amount = amount;
        Ok(())
    }

    /// Set the destination address.
    ///
    /// Syntactic validity is checked at validation time, so a partially
    /// typed recipient can be stored while editing.
    pub fn set_recipient(&mut self, recipient: impl Into<String>) {
        self.recipient = recipient.into();
    }

    /// Set or clear the destination tag. Tags outside the 32-bit tag space
    /// are rejected.
    pub fn set_tag(&mut self, tag: Option<u64>) -> Result<()> {
        self.tag = match tag {
            None => None,
            Some(value) => Some(u32::try_from(value).map_err(|_| {
                Error::InvalidTag(format!("{} exceeds the 32-bit tag space", value))
            })?),
        };
        Ok(())
    }

    /// Override or clear the fee. Clearing lets the next enrichment pass
    /// default it again.
    pub fn set_fee(&mut self, fee: Option<u64>) {
        self.fee = fee;
    }

    /// Set the fee display unit.
    pub fn set_fee_unit(&mut self, unit: FeeUnit) {
        self.fee_unit = unit;
    }

    /// Attach a fresh fee recommendation, defaulting the fee when the user
    /// has not set one. Re-runnable any time the draft changes.
    pub fn attach_network_info(&mut self, info: NetworkInfo) {
        self.network_info = Some(info);
        if self.fee.is_none() {
            self.fee = Some(info.base_fee);
        }
    }
}
