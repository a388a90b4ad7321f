//! Shared, request-coalescing caches
//!
//! Both caches are plain objects handed to the engines that need them, so
//! two engines sharing one cache instance share its contents and its
//! in-flight coalescing, and tests construct isolated instances.
//!
//! Coalescing uses a per-key gate: a miss takes the key's async mutex,
//! re-checks the entry, and only fetches if still absent. Concurrent
//! misses for the same key therefore cost one underlying fetch; the
//! followers find the leader's entry when they acquire the gate.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

use xrpl_account_core::is_valid_classic_address;

use crate::client::{LedgerApi, ServerInfo};
use crate::error::{Error, Result};

/// How long a fetched [`ServerInfo`] stays fresh
pub const SERVER_INFO_TTL: Duration = Duration::from_secs(60);

/// Per-endpoint cache of node state with TTL expiry and coalesced fetches.
pub struct ServerInfoCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (ServerInfo, Instant)>>,
    gates: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Default for ServerInfoCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerInfoCache {
    /// Create a cache with the standard TTL.
    pub fn new() -> Self {
        Self::with_ttl(SERVER_INFO_TTL)
    }

    /// Create a cache with a custom TTL. A zero TTL disables caching while
    /// keeping coalescing, which tests rely on.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }

    async fn gate_for(&self, key: &str) -> Arc<Mutex<()>> {
        let mut gates = self.gates.lock().await;
        Arc::clone(gates.entry(key.to_string()).or_default())
    }

    async fn lookup(&self, key: &str) -> Option<ServerInfo> {
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .filter(|(_, fetched_at)| fetched_at.elapsed() < self.ttl)
            .map(|(info, _)| *info)
    }

    /// Return fresh server info for the API's endpoint, fetching at most
    /// once per TTL window regardless of concurrent callers.
    ///
    /// A failed fetch evicts any stale entry so the next caller retries
    /// instead of serving outdated state.
    pub async fn get(&self, api: &dyn LedgerApi) -> Result<ServerInfo> {
        let key = api.endpoint().url.clone();

        if let Some(info) = self.lookup(&key).await {
            return Ok(info);
        }

        let gate = self.gate_for(&key).await;
        let _leader = gate.lock().await;

        // A concurrent leader may have filled the entry while we waited.
        if let Some(info) = self.lookup(&key).await {
            return Ok(info);
        }

        debug!(endpoint = %key, "refreshing server info");
        match fetch_server_info(api).await {
            Ok(info) => {
                let mut entries = self.entries.lock().await;
                entries.insert(key, (info, Instant::now()));
                Ok(info)
            }
            Err(err) => {
                let mut entries = self.entries.lock().await;
                entries.remove(&key);
                Err(err)
            }
        }
    }

    /// Drop the cached entry for an endpoint.
    pub async fn invalidate(&self, url: &str) {
        let mut entries = self.entries.lock().await;
        entries.remove(url);
    }
}

async fn fetch_server_info(api: &dyn LedgerApi) -> Result<ServerInfo> {
    api.connect().await?;
    let result = api.server_info().await;
    let disconnected = api.disconnect().await;
    let info = result?;
    disconnected?;
    Ok(info)
}

/// Memoized "is this recipient account new on the ledger" lookups.
///
/// An entry stays valid until explicitly evicted; broadcasting a payment to
/// an address evicts it, since the payment may have created the account.
#[derive(Default)]
pub struct RecipientCache {
    entries: Mutex<HashMap<String, bool>>,
    gates: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RecipientCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    async fn gate_for(&self, address: &str) -> Arc<Mutex<()>> {
        let mut gates = self.gates.lock().await;
        Arc::clone(gates.entry(address.to_string()).or_default())
    }

    /// Whether `address` has no ledger entry yet.
    ///
    /// Syntactically invalid addresses are reported as not-new without
    /// caching; address validity is the validation gate's concern. Probe
    /// failures other than not-found propagate and are never cached.
    pub async fn is_new(&self, api: &dyn LedgerApi, address: &str) -> Result<bool> {
        if !is_valid_classic_address(address) {
            return Ok(false);
        }

        {
            let entries = self.entries.lock().await;
            if let Some(&is_new) = entries.get(address) {
                return Ok(is_new);
            }
        }

        let gate = self.gate_for(address).await;
        let _leader = gate.lock().await;

        {
            let entries = self.entries.lock().await;
            if let Some(&is_new) = entries.get(address) {
                return Ok(is_new);
            }
        }

        let is_new = probe_account(api, address).await?;
        debug!(address, is_new, "recipient probe");
        let mut entries = self.entries.lock().await;
        entries.insert(address.to_string(), is_new);
        Ok(is_new)
    }

    /// Forget what we know about an address, including its coalescing
    /// gate, so the map does not grow with every recipient ever seen.
    pub async fn evict(&self, address: &str) {
        let mut entries = self.entries.lock().await;
        entries.remove(address);
        drop(entries);
        let mut gates = self.gates.lock().await;
        gates.remove(address);
    }
}

async fn probe_account(api: &dyn LedgerApi, address: &str) -> Result<bool> {
    api.connect().await?;
    let result = api.account_info(address).await;
    let disconnected = api.disconnect().await;
    let is_new = match result {
        Ok(_) => false,
        Err(Error::AccountNotFound(_)) => true,
        Err(err) => return Err(err),
    };
    disconnected?;
    Ok(is_new)
}
