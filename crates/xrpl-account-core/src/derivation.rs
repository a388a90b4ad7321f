//! Derivation-scheme metadata for account discovery

use serde::{Deserialize, Serialize};

/// Key-derivation scheme supported by a currency.
///
/// Ordering in a currency's mode table is the order discovery walks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DerivationMode {
    /// BIP44 account-level derivation; one fresh address per account index.
    Default,
    /// Single-account scheme used by older wallets; not indexable beyond
    /// the first account.
    Legacy,
}

impl DerivationMode {
    /// Identifier fragment used in account ids
    pub fn key(&self) -> &'static str {
        match self {
            DerivationMode::Default => "",
            DerivationMode::Legacy => "legacy",
        }
    }

    /// The placeholder-emitting mode: discovery surfaces one empty account
    /// for the next unused index so a new account can be created.
    pub fn is_default(&self) -> bool {
        matches!(self, DerivationMode::Default)
    }

    /// Whether indices beyond 0 are ever scanned for this mode
    pub fn is_indexable(&self) -> bool {
        match self {
            DerivationMode::Default => true,
            DerivationMode::Legacy => false,
        }
    }

    /// Build the derivation path for `index`
    pub fn path(&self, coin_type: u32, index: u32) -> String {
        match self {
            DerivationMode::Default => format!("44'/{}'/{}'/0/0", coin_type, index),
            DerivationMode::Legacy => format!("44'/{}'/0'/{}", coin_type, index),
        }
    }
}

/// Static currency metadata consumed by discovery
#[derive(Debug, Clone, Copy)]
pub struct CurrencyInfo {
    /// Currency identifier ("xrp")
    pub id: &'static str,
    /// BIP44 coin type
    pub coin_type: u32,
    /// Supported derivation modes, in scan order
    pub modes: &'static [DerivationMode],
}

impl CurrencyInfo {
    /// XRP Ledger metadata
    pub const XRP: CurrencyInfo = CurrencyInfo {
        id: "xrp",
        coin_type: 144,
        modes: &[DerivationMode::Default, DerivationMode::Legacy],
    };
}
