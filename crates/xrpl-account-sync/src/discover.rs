//! Device-driven account discovery
//!
//! Walks every derivation mode of a currency, asking the device for the
//! address at each index and the ledger whether that address exists.
//! Accounts stream out over a channel as they are found, so callers can
//! render results while the scan is still running.

use tokio::sync::mpsc;
use tracing::{debug, info};

use xrpl_account_core::{merge, Account, CurrencyInfo};

use crate::cache::ServerInfoCache;
use crate::cancel::CancelToken;
use crate::client::{parse_drops, LedgerApi};
use crate::device::{with_session, DeviceConnector};
use crate::error::{Error, Result};
use crate::sync::operation_from_tx;

/// Scan the device's derivation space for existing accounts.
///
/// For each mode in `currency.modes`, indices are walked from 0 until an
/// address with no ledger entry is hit. For the default mode that first
/// unused address is emitted as an empty placeholder account, so a new
/// account can be created on it; other modes stop silently. Non-indexable
/// modes only ever check index 0.
///
/// Found accounts are sent on `found` as they appear. A dropped receiver
/// ends the scan without error. Cancellation is honored between device and
/// network calls and returns [`Error::Cancelled`].
pub async fn scan_accounts(
    api: &dyn LedgerApi,
    connector: &dyn DeviceConnector,
    device_id: &str,
    currency: &CurrencyInfo,
    server_cache: &ServerInfoCache,
    cancel: &CancelToken,
    found: mpsc::Sender<Account>,
) -> Result<()> {
    cancel.checkpoint()?;

    with_session(connector, device_id, |session| async move {
        api.connect().await?;
        let result = scan_modes(
            api,
            session.as_ref(),
            currency,
            server_cache,
            cancel,
            &found,
        )
        .await;
        let disconnected = api.disconnect().await;
        result?;
        disconnected
    })
    .await
}

async fn scan_modes(
    api: &dyn LedgerApi,
    session: &dyn crate::device::DeviceSession,
    currency: &CurrencyInfo,
    server_cache: &ServerInfoCache,
    cancel: &CancelToken,
    found: &mpsc::Sender<Account>,
) -> Result<()> {
    for &mode in currency.modes {
        debug!(currency = currency.id, ?mode, "scanning derivation mode");

        for index in 0u32.. {
            cancel.checkpoint()?;

            let path = mode.path(currency.coin_type, index);
            let address = session.get_address(currency.id, &path).await?;

            cancel.checkpoint()?;
            match api.account_info(&address).await {
                Ok(data) => {
                    cancel.checkpoint()?;
                    let server = server_cache.get(api).await?;
                    let account_id = Account::account_id(currency.id, &address, mode);
                    let fetched: Vec<_> = api
                        .account_transactions(&address, server.min_ledger, server.max_ledger)
                        .await?
                        .iter()
                        .map(|tx| operation_from_tx(&account_id, &address, tx))
                        .collect();

                    let mut account = Account::placeholder(currency.id, address, path, mode);
                    account.balance = parse_drops(&data.balance)?;
                    account.block_height = server.max_ledger;
                    account.operations = merge(&[], &fetched);

                    info!(id = %account.id, index, "account discovered");
                    if found.send(account).await.is_err() {
                        // Receiver gone; the caller stopped listening.
                        return Ok(());
                    }
                    if !mode.is_indexable() {
                        break;
                    }
                }
                Err(Error::AccountNotFound(_)) => {
                    // First unused index ends this mode. Default mode
                    // surfaces it as an empty placeholder so a fresh
                    // account can be created on it.
                    if mode.is_default() {
                        let placeholder = Account::placeholder(currency.id, address, path, mode);
                        info!(id = %placeholder.id, index, "placeholder account");
                        if found.send(placeholder).await.is_err() {
                            return Ok(());
                        }
                    }
                    break;
                }
                Err(err) => return Err(err),
            }
        }
    }
    Ok(())
}
