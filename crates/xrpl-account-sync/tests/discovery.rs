//! End-to-end discovery tests against scripted device and node doubles

mod common;

use std::sync::atomic::Ordering;

use tokio::sync::mpsc;

use common::{address_for, ledger_time, MockApi, MockConnector};
use xrpl_account_core::{Account, CurrencyInfo, DerivationMode};
use xrpl_account_sync::{scan_accounts, CancelToken, Error, LedgerTransaction, ServerInfoCache};

async fn run_scan(api: &MockApi, connector: &MockConnector) -> Result<Vec<Account>, Error> {
    common::init_tracing();
    let cache = ServerInfoCache::new();
    let cancel = CancelToken::new();
    let (tx, mut rx) = mpsc::channel(32);

    scan_accounts(
        api,
        connector,
        "device-1",
        &CurrencyInfo::XRP,
        &cache,
        &cancel,
        tx,
    )
    .await?;

    let mut accounts = Vec::new();
    while let Ok(account) = rx.try_recv() {
        accounts.push(account);
    }
    Ok(accounts)
}

#[tokio::test]
async fn test_empty_device_yields_one_placeholder() {
    let api = MockApi::new();
    let connector = MockConnector::new();

    let accounts = run_scan(&api, &connector).await.unwrap();

    // Default mode emits a placeholder at index 0; legacy stops silently.
    assert_eq!(accounts.len(), 1);
    let placeholder = &accounts[0];
    assert_eq!(placeholder.fresh_address, address_for("44'/144'/0'/0/0"));
    assert_eq!(placeholder.fresh_address_path, "44'/144'/0'/0/0");
    assert_eq!(placeholder.balance, 0);
    assert!(placeholder.operations.is_empty());

    assert_eq!(connector.open_count(), 1);
    assert_eq!(connector.close_count(), 1);
}

#[tokio::test]
async fn test_found_accounts_then_placeholder() {
    let first = address_for("44'/144'/0'/0/0");
    let second = address_for("44'/144'/1'/0/0");
    let api = MockApi::new()
        .with_account(&first, "50000000", 3)
        .with_account(&second, "7000000", 1)
        .with_transaction(
            &first,
            LedgerTransaction {
                hash: "AAAA".to_string(),
                sender: "rSomeoneElse".to_string(),
                destination: first.clone(),
                destination_tag: None,
                amount: 50_000_000,
                fee: 10,
                sequence: 1,
                ledger_version: 80_000_000,
                date: ledger_time(1_700_000_000),
            },
        );
    let connector = MockConnector::new();

    let accounts = run_scan(&api, &connector).await.unwrap();

    // Two funded accounts, then the placeholder at index 2.
    assert_eq!(accounts.len(), 3);
    assert_eq!(accounts[0].fresh_address, first);
    assert_eq!(accounts[0].balance, 50_000_000);
    assert_eq!(accounts[0].operations.len(), 1);
    assert_eq!(accounts[1].fresh_address, second);
    assert_eq!(accounts[2].fresh_address, address_for("44'/144'/2'/0/0"));
    assert_eq!(accounts[2].balance, 0);
}

#[tokio::test]
async fn test_legacy_account_found_without_placeholder() {
    let legacy = address_for("44'/144'/0'/0");
    let api = MockApi::new().with_account(&legacy, "9000000", 2);
    let connector = MockConnector::new();

    let accounts = run_scan(&api, &connector).await.unwrap();

    // Default placeholder plus the legacy account; no legacy placeholder
    // and no legacy index 1 probe since the mode is not indexable.
    assert_eq!(accounts.len(), 2);
    assert_eq!(accounts[1].fresh_address, legacy);
    assert_eq!(
        accounts[1].id,
        Account::account_id("xrp", &legacy, DerivationMode::Legacy)
    );
}

#[tokio::test]
async fn test_cancellation_during_lookup_stops_before_history_fetch() {
    common::init_tracing();
    let first = address_for("44'/144'/0'/0/0");
    let cancel = CancelToken::new();
    let mut api = MockApi::new().with_account(&first, "50000000", 3);
    // Cancellation lands while the existence lookup is in flight.
    api.cancel_on_account_info = Some(cancel.clone());
    let connector = MockConnector::new();
    let cache = ServerInfoCache::new();

    let (tx, _rx) = mpsc::channel(4);
    let result = scan_accounts(
        &api,
        &connector,
        "device-1",
        &CurrencyInfo::XRP,
        &cache,
        &cancel,
        tx,
    )
    .await;

    assert!(matches!(result, Err(Error::Cancelled)));
    // Neither the server-info fetch nor the history fetch ran.
    assert_eq!(api.info_calls.load(Ordering::SeqCst), 0);
    assert_eq!(api.tx_calls.load(Ordering::SeqCst), 0);
    assert_eq!(connector.close_count(), 1);
}

#[tokio::test]
async fn test_cancelled_scan_never_touches_the_device() {
    let api = MockApi::new();
    let connector = MockConnector::new();
    let cache = ServerInfoCache::new();
    let cancel = CancelToken::new();
    cancel.cancel();

    let (tx, _rx) = mpsc::channel(1);
    let result = scan_accounts(
        &api,
        &connector,
        "device-1",
        &CurrencyInfo::XRP,
        &cache,
        &cancel,
        tx,
    )
    .await;

    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(connector.open_count(), 0);
}

#[tokio::test]
async fn test_dropped_receiver_ends_scan_cleanly() {
    let api = MockApi::new();
    let connector = MockConnector::new();
    let cache = ServerInfoCache::new();
    let cancel = CancelToken::new();

    let (tx, rx) = mpsc::channel(1);
    drop(rx);

    let result = scan_accounts(
        &api,
        &connector,
        "device-1",
        &CurrencyInfo::XRP,
        &cache,
        &cancel,
        tx,
    )
    .await;

    assert!(result.is_ok());
    // The session is still released.
    assert_eq!(connector.close_count(), 1);
}
