//! Node-facing API surface
//!
//! [`LedgerApi`] abstracts over whatever transport talks to a rippled-style
//! node. Engines in this crate only ever hold a `dyn LedgerApi`, so tests
//! substitute scripted implementations and production wires in a real
//! client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use xrpl_account_core::Error as CoreError;

use crate::error::{Error, Result};

/// Engine result code a node reports for an accepted submission
pub const SUBMIT_SUCCESS_CODE: &str = "tesSUCCESS";

/// Where a [`LedgerApi`] implementation points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Node URL, also the cache key for per-endpoint caches
    pub url: String,
}

/// Snapshot of node-reported ledger state and fee schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Oldest validated ledger the node can serve
    pub min_ledger: u64,
    /// Newest validated ledger
    pub max_ledger: u64,
    /// Current base fee in drops
    pub base_fee: u64,
    /// Account creation reserve in drops
    pub base_reserve: u64,
    /// Per-owned-object reserve in drops
    pub owner_reserve: u64,
}

/// On-ledger account state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountData {
    /// Balance in drops, as the decimal string the node reports
    pub balance: String,
    /// Next valid transaction sequence number
    pub sequence: u64,
}

/// One validated payment transaction touching an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    /// Canonical transaction hash, upper-case hex
    pub hash: String,
    /// Sending classic address
    pub sender: String,
    /// Receiving classic address
    pub destination: String,
    /// Destination tag, if the payment carried one
    pub destination_tag: Option<u32>,
    /// Amount delivered in drops
    pub amount: u64,
    /// Fee burned in drops
    pub fee: u64,
    /// Sender's sequence number for this transaction
    pub sequence: u64,
    /// Ledger the transaction was validated in
    pub ledger_version: u64,
    /// Close time of that ledger
    pub date: DateTime<Utc>,
}

/// Payment to prepare for signing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Sending classic address
    pub source: String,
    /// Receiving classic address
    pub destination: String,
    /// Amount in drops
    pub amount: u64,
    /// Destination tag, if any
    pub destination_tag: Option<u32>,
}

/// Signing-independent parameters attached when preparing a payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInstructions {
    /// Fee in drops
    pub fee: u64,
    /// Ledgers past the current validated ledger the transaction
    /// stays valid for
    pub max_ledger_offset: u64,
}

/// Outcome of submitting a signed transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResult {
    /// Engine result code, e.g. `tesSUCCESS` or `tecUNFUNDED_PAYMENT`
    pub engine_result: String,
    /// Human-readable message the node attached to the result
    pub message: String,
}

impl SubmitResult {
    /// Whether the node queued the transaction for inclusion.
    pub fn is_success(&self) -> bool {
        self.engine_result == SUBMIT_SUCCESS_CODE
    }
}

/// Node-facing operations the engines need.
///
/// `connect` and `disconnect` bracket every burst of calls; implementations
/// may pool the underlying transport and treat them as reference counting.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Endpoint this API instance talks to.
    fn endpoint(&self) -> &EndpointConfig;

    /// Open the transport.
    async fn connect(&self) -> Result<()>;

    /// Release the transport.
    async fn disconnect(&self) -> Result<()>;

    /// Fetch the node's ledger range and fee schedule.
    async fn server_info(&self) -> Result<ServerInfo>;

    /// Fetch on-ledger account state.
    ///
    /// Returns [`Error::AccountNotFound`] when the address has no ledger
    /// entry, which callers distinguish from transport failures.
    async fn account_info(&self, address: &str) -> Result<AccountData>;

    /// Fetch validated payment transactions touching `address` within the
    /// inclusive ledger range.
    async fn account_transactions(
        &self,
        address: &str,
        min_ledger: u64,
        max_ledger: u64,
    ) -> Result<Vec<LedgerTransaction>>;

    /// Build the unsigned transaction blob for a payment.
    async fn prepare_payment(
        &self,
        payment: &Payment,
        instructions: &PaymentInstructions,
    ) -> Result<Vec<u8>>;

    /// Submit a signed transaction blob.
    async fn submit(&self, signed: &[u8]) -> Result<SubmitResult>;
}

/// Parse a node-reported `complete_ledgers` range such as
/// `"32570-91234567"` or `"2-100,32570-91234567"` into the most recent
/// contiguous span.
pub fn parse_ledger_range(range: &str) -> Result<(u64, u64)> {
    let span = range
        .rsplit(',')
        .next()
        .ok_or_else(|| Error::Network(format!("empty ledger range: {:?}", range)))?;
    let (lo, hi) = span
        .split_once('-')
        .ok_or_else(|| Error::Network(format!("malformed ledger range: {:?}", range)))?;

    let lo: u64 = lo
        .trim()
        .parse()
        .map_err(|_| Error::Network(format!("malformed ledger range: {:?}", range)))?;
    let hi: u64 = hi
        .trim()
        .parse()
        .map_err(|_| Error::Network(format!("malformed ledger range: {:?}", range)))?;

    if lo > hi {
        return Err(Error::Network(format!(
            "inverted ledger range: {:?}",
            range
        )));
    }
    Ok((lo, hi))
}

/// Parse a node-reported drop amount.
///
/// A balance the node hands back that does not parse is a data integrity
/// failure, not a user error.
pub fn parse_drops(value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|_| Error::Core(CoreError::InvalidBalance(value.to_string())))
}
