//! Shared scripted doubles for the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use xrpl_account_core::encode_classic_address;
use xrpl_account_sync::{
    AccountData, CancelToken, DeviceConnector, DeviceSession, EndpointConfig, Error, LedgerApi,
    LedgerTransaction, Payment, PaymentInstructions, Result, ServerInfo, SubmitResult,
    SUBMIT_SUCCESS_CODE,
};

pub const TEST_SERVER: ServerInfo = ServerInfo {
    min_ledger: 32_570,
    max_ledger: 90_000_000,
    base_fee: 10,
    base_reserve: 20,
    owner_reserve: 5,
};

/// Deterministic classic address for a derivation path, shared between the
/// scripted device and test expectations.
pub fn address_for(path: &str) -> String {
    let mut account_id = [0u8; 20];
    for (i, byte) in path.bytes().enumerate() {
        account_id[i % 20] = account_id[i % 20].wrapping_add(byte).wrapping_mul(31);
    }
    encode_classic_address(&account_id)
}

pub fn ledger_time(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// Scripted node API with call counters.
pub struct MockApi {
    pub endpoint: EndpointConfig,
    pub server: ServerInfo,
    pub accounts: HashMap<String, AccountData>,
    pub transactions: HashMap<String, Vec<LedgerTransaction>>,
    pub submit_result: SubmitResult,
    pub fail_account_info: bool,
    pub fail_transactions: bool,
    pub fail_disconnect_after_submit: bool,
    pub cancel_on_account_info: Option<CancelToken>,
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
    pub info_calls: AtomicUsize,
    pub account_calls: AtomicUsize,
    pub tx_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            endpoint: EndpointConfig {
                url: "wss://node.test:51233".to_string(),
            },
            server: TEST_SERVER,
            accounts: HashMap::new(),
            transactions: HashMap::new(),
            submit_result: SubmitResult {
                engine_result: SUBMIT_SUCCESS_CODE.to_string(),
                message: "queued".to_string(),
            },
            fail_account_info: false,
            fail_transactions: false,
            fail_disconnect_after_submit: false,
            cancel_on_account_info: None,
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
            info_calls: AtomicUsize::new(0),
            account_calls: AtomicUsize::new(0),
            tx_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_account(mut self, address: &str, balance: &str, sequence: u64) -> Self {
        self.accounts.insert(
            address.to_string(),
            AccountData {
                balance: balance.to_string(),
                sequence,
            },
        );
        self
    }

    pub fn with_transaction(mut self, address: &str, tx: LedgerTransaction) -> Self {
        self.transactions
            .entry(address.to_string())
            .or_default()
            .push(tx);
        self
    }
}

#[async_trait]
impl LedgerApi for MockApi {
    fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    async fn connect(&self) -> Result<()> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        if self.fail_disconnect_after_submit && self.submit_calls.load(Ordering::SeqCst) > 0 {
            return Err(Error::Network("socket dropped during teardown".to_string()));
        }
        Ok(())
    }

    async fn server_info(&self) -> Result<ServerInfo> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.server)
    }

    async fn account_info(&self, address: &str) -> Result<AccountData> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(cancel) = &self.cancel_on_account_info {
            cancel.cancel();
        }
        if self.fail_account_info {
            return Err(Error::Network("node unavailable".to_string()));
        }
        self.accounts
            .get(address)
            .cloned()
            .ok_or_else(|| Error::AccountNotFound(address.to_string()))
    }

    async fn account_transactions(
        &self,
        address: &str,
        min_ledger: u64,
        max_ledger: u64,
    ) -> Result<Vec<LedgerTransaction>> {
        self.tx_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_transactions {
            return Err(Error::Network("node unavailable".to_string()));
        }
        Ok(self
            .transactions
            .get(address)
            .map(|txs| {
                txs.iter()
                    .filter(|tx| tx.ledger_version >= min_ledger && tx.ledger_version <= max_ledger)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn prepare_payment(
        &self,
        payment: &Payment,
        instructions: &PaymentInstructions,
    ) -> Result<Vec<u8>> {
        let mut blob = payment.destination.as_bytes().to_vec();
        blob.extend_from_slice(&payment.amount.to_be_bytes());
        blob.extend_from_slice(&instructions.fee.to_be_bytes());
        Ok(blob)
    }

    async fn submit(&self, _signed: &[u8]) -> Result<SubmitResult> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.submit_result.clone())
    }
}

/// Scripted signing device backing [`MockConnector`].
pub struct MockSession {
    fail_signing: bool,
    cancel_on_sign: Option<CancelToken>,
    closes: Arc<AtomicUsize>,
    signs: Arc<AtomicUsize>,
}

#[async_trait]
impl DeviceSession for MockSession {
    async fn get_address(&self, _currency_id: &str, path: &str) -> Result<String> {
        Ok(address_for(path))
    }

    async fn sign_transaction(
        &self,
        _currency_id: &str,
        _path: &str,
        payload: &[u8],
    ) -> Result<Vec<u8>> {
        self.signs.fetch_add(1, Ordering::SeqCst);
        if let Some(cancel) = &self.cancel_on_sign {
            cancel.cancel();
        }
        if self.fail_signing {
            return Err(Error::Device("user rejected on device".to_string()));
        }
        let mut signed = payload.to_vec();
        signed.extend_from_slice(b"SIGNED");
        Ok(signed)
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Scripted device connector with open/close/sign counters.
#[derive(Default)]
pub struct MockConnector {
    pub fail_signing: bool,
    pub cancel_on_sign: Option<CancelToken>,
    pub opens: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
    pub signs: Arc<AtomicUsize>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn sign_count(&self) -> usize {
        self.signs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceConnector for MockConnector {
    async fn open(&self, _device_id: &str) -> Result<Box<dyn DeviceSession>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            fail_signing: self.fail_signing,
            cancel_on_sign: self.cancel_on_sign.clone(),
            closes: Arc::clone(&self.closes),
            signs: Arc::clone(&self.signs),
        }))
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
