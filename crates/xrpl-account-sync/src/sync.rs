//! Incremental account synchronization
//!
//! A sync pass reads the node's view of one account and emits
//! [`AccountPatch`] commands over a channel. The engine never holds or
//! mutates account state; the caller folds the patches into its own
//! snapshot with [`xrpl_account_core::apply`], in emission order.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use xrpl_account_core::{
    merge, reconcile_pending, Account, AccountPatch, Operation, OperationType,
};

use crate::cache::ServerInfoCache;
use crate::cancel::CancelToken;
use crate::client::{parse_drops, LedgerApi, LedgerTransaction};
use crate::error::{Error, Result};

/// Patch-emitting sync engine for one endpoint.
pub struct SyncEngine {
    api: Arc<dyn LedgerApi>,
    server_cache: Arc<ServerInfoCache>,
    cancel: CancelToken,
}

impl SyncEngine {
    /// Create an engine over an API, a shared server-info cache, and a
    /// cancellation token.
    pub fn new(
        api: Arc<dyn LedgerApi>,
        server_cache: Arc<ServerInfoCache>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            api,
            server_cache,
            cancel,
        }
    }

    /// Run one sync pass for `account`, emitting patches on `patches`.
    ///
    /// Emits `BalanceUpdated` as soon as the balance is known, then
    /// `OperationsMerged` once history has been fetched and reconciled.
    /// An account with no ledger entry yet syncs to nothing: no patches,
    /// no error. A dropped receiver ends the pass without error; patches
    /// already emitted remain valid.
    pub async fn sync(
        &self,
        account: &Account,
        patches: mpsc::Sender<AccountPatch>,
    ) -> Result<()> {
        self.cancel.checkpoint()?;

        let server = self.server_cache.get(self.api.as_ref()).await?;

        self.api.connect().await?;
        let result = self.sync_inner(account, server, &patches).await;
        let disconnected = self.api.disconnect().await;
        result?;
        disconnected
    }

    async fn sync_inner(
        &self,
        account: &Account,
        server: crate::client::ServerInfo,
        patches: &mpsc::Sender<AccountPatch>,
    ) -> Result<()> {
        let data = match self.api.account_info(&account.fresh_address).await {
            Ok(data) => data,
            Err(Error::AccountNotFound(_)) => {
                debug!(id = %account.id, "account not on ledger yet, nothing to sync");
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let balance = parse_drops(&data.balance)?;
        if patches
            .send(AccountPatch::BalanceUpdated {
                balance,
                block_height: server.max_ledger,
            })
            .await
            .is_err()
        {
            return Ok(());
        }

        self.cancel.checkpoint()?;

        let min_ledger = account.sync_floor().max(server.min_ledger);
        let fetched: Vec<Operation> = self
            .api
            .account_transactions(&account.fresh_address, min_ledger, server.max_ledger)
            .await?
            .iter()
            .map(|tx| operation_from_tx(&account.id, &account.fresh_address, tx))
            .collect();

        let operations = merge(&account.operations, &fetched);
        let pending_operations = reconcile_pending(&account.pending_operations, &operations);

        info!(
            id = %account.id,
            fetched = fetched.len(),
            confirmed = operations.len(),
            pending = pending_operations.len(),
            "sync pass complete"
        );

        let _ = patches
            .send(AccountPatch::OperationsMerged {
                operations,
                pending_operations,
                last_sync: Utc::now(),
            })
            .await;
        Ok(())
    }
}

/// Map a validated ledger transaction to an account operation.
///
/// Direction is decided by the sender field. An outgoing value includes
/// the burned fee since both left the account; an incoming value is the
/// delivered amount alone.
pub fn operation_from_tx(
    account_id: &str,
    address: &str,
    tx: &LedgerTransaction,
) -> Operation {
    let kind = if tx.sender == address {
        OperationType::Out
    } else {
        OperationType::In
    };
    let value = match kind {
        OperationType::Out => tx.amount.saturating_add(tx.fee),
        OperationType::In => tx.amount,
    };
    Operation {
        id: Operation::operation_id(account_id, &tx.hash, kind),
        hash: tx.hash.clone(),
        kind,
        value,
        fee: tx.fee,
        senders: vec![tx.sender.clone()],
        recipients: vec![tx.destination.clone()],
        date: tx.date,
        sequence: tx.sequence,
        block_height: Some(tx.ledger_version),
    }
}
