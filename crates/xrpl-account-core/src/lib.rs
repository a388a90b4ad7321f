//! XRP Ledger account model
//!
//! This crate implements the pure half of the account engine: the account
//! and operation model, deterministic identifiers, operation reconciliation,
//! sync patch commands, transaction drafting, derivation-scheme metadata,
//! and classic address validation. No I/O lives here.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod account;
pub mod address;
pub mod derivation;
pub mod draft;
pub mod error;
pub mod operation;
pub mod patch;
pub mod reconcile;

pub use account::Account;
pub use address::{decode_classic_address, encode_classic_address, is_valid_classic_address};
pub use derivation::{CurrencyInfo, DerivationMode};
pub use draft::{FeeUnit, NetworkInfo, TransactionDraft};
pub use error::{Error, Result};
pub use operation::{Operation, OperationType};
pub use patch::{apply, AccountPatch};
pub use reconcile::{merge, reconcile_pending};
