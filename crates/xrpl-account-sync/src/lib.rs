//! Account discovery, incremental sync, and transaction lifecycle for XRP
//! Ledger accounts backed by a hardware signing device.
//!
//! The crate is organized around a small number of injected seams:
//!
//! - [`LedgerApi`]: the node-facing surface (server info, account state,
//!   transaction history, payment preparation, submission)
//! - [`DeviceConnector`] / [`DeviceSession`]: the signing-device surface
//! - [`ServerInfoCache`] / [`RecipientCache`]: shared, coalescing caches
//!   handed to the engines rather than hidden in module state
//!
//! Long-running operations ([`scan_accounts`], [`SyncEngine::sync`]) stream
//! their results over channels and honor a [`CancelToken`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod cancel;
pub mod client;
pub mod device;
pub mod discover;
pub mod error;
pub mod lifecycle;
pub mod sync;

pub use cache::{RecipientCache, ServerInfoCache, SERVER_INFO_TTL};
pub use cancel::CancelToken;
pub use client::{
    parse_drops, parse_ledger_range, AccountData, EndpointConfig, LedgerApi, LedgerTransaction,
    Payment, PaymentInstructions, ServerInfo, SubmitResult, SUBMIT_SUCCESS_CODE,
};
pub use device::{with_session, DeviceConnector, DeviceSession};
pub use discover::scan_accounts;
pub use error::{Error, Result};
pub use lifecycle::{
    canonical_tx_hash, load_network_info, sign_and_broadcast, validate, LEDGER_VALIDITY_OFFSET,
};
pub use sync::{operation_from_tx, SyncEngine};
