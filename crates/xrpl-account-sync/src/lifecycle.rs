//! Transaction lifecycle: enrichment, validation, signing, broadcast
//!
//! A draft moves through fixed stages. Network enrichment attaches the fee
//! recommendation, validation gates it against account and ledger state,
//! then the device signs the prepared blob and the node broadcasts it.
//! On success a pending operation is synthesized so the caller's history
//! reflects the payment before the ledger confirms it.

use chrono::Utc;
use sha2::{Digest, Sha512};
use tracing::{info, warn};

use xrpl_account_core::{
    is_valid_classic_address, Account, Error as CoreError, NetworkInfo, Operation, OperationType,
    TransactionDraft,
};

use crate::cache::{RecipientCache, ServerInfoCache};
use crate::cancel::CancelToken;
use crate::client::{LedgerApi, Payment, PaymentInstructions, ServerInfo};
use crate::device::{with_session, DeviceConnector};
use crate::error::{Error, Result};

/// How many ledgers past the current validated ledger a prepared
/// transaction stays valid for
pub const LEDGER_VALIDITY_OFFSET: u64 = 12;

/// Prefix hashed ahead of a signed blob to form the canonical
/// transaction hash
const TXN_HASH_PREFIX: [u8; 4] = [0x54, 0x58, 0x4E, 0x00];

/// Enrich a draft with the current fee recommendation.
///
/// Defaults the draft's fee when the user has not set one, and returns the
/// attached info so callers can display the reserve.
pub async fn load_network_info(
    api: &dyn LedgerApi,
    server_cache: &ServerInfoCache,
    draft: &mut TransactionDraft,
) -> Result<NetworkInfo> {
    let server = server_cache.get(api).await?;
    let info = NetworkInfo {
        base_fee: server.base_fee,
        base_reserve: server.base_reserve,
    };
    draft.attach_network_info(info);
    Ok(info)
}

/// Validate a draft against account and ledger state.
///
/// Gates run in a fixed order so the user sees the most fundamental
/// problem first: missing fee, malformed recipient, unfunded account
/// creation, then insufficient balance. The sender's own reserve stays
/// locked and counts against the spendable balance.
pub fn validate(
    account: &Account,
    draft: &TransactionDraft,
    recipient_is_new: bool,
    server: ServerInfo,
) -> Result<()> {
    let fee = draft.fee.ok_or(CoreError::FeeNotLoaded)?;

    if !is_valid_classic_address(&draft.recipient) {
        return Err(CoreError::InvalidAddress(draft.recipient.clone()).into());
    }

    if recipient_is_new && draft.amount < server.base_reserve {
        return Err(CoreError::DestinationNotCreated {
            minimum: server.base_reserve,
        }
        .into());
    }

    let required = draft
        .amount
        .checked_add(fee)
        .and_then(|total| total.checked_add(server.base_reserve))
        .ok_or_else(|| CoreError::InvalidAmount("amount overflows drop arithmetic".to_string()))?;
    if required > account.balance {
        return Err(CoreError::InsufficientBalance {
            required,
            available: account.balance,
        }
        .into());
    }

    Ok(())
}

/// Sign a validated draft on the device, broadcast it, and synthesize the
/// pending operation.
///
/// Cancellation is honored up to the moment the signed blob is handed to
/// the node; once broadcast begins the call runs to completion. On success
/// the recipient's newness entry is evicted, since this payment may have
/// created the account.
#[allow(clippy::too_many_arguments)]
pub async fn sign_and_broadcast(
    api: &dyn LedgerApi,
    connector: &dyn DeviceConnector,
    device_id: &str,
    currency_id: &str,
    account: &Account,
    draft: &TransactionDraft,
    server_cache: &ServerInfoCache,
    recipients: &RecipientCache,
    cancel: &CancelToken,
) -> Result<Operation> {
    cancel.checkpoint()?;

    let server = server_cache.get(api).await?;
    let recipient_is_new = recipients.is_new(api, &draft.recipient).await?;
    validate(account, draft, recipient_is_new, server)?;

    // validate() guarantees the fee is present.
    let fee = draft.fee.ok_or(CoreError::FeeNotLoaded)?;
    let payment = Payment {
        source: account.fresh_address.clone(),
        destination: draft.recipient.clone(),
        amount: draft.amount,
        destination_tag: draft.tag,
    };
    let instructions = PaymentInstructions {
        fee,
        max_ledger_offset: LEDGER_VALIDITY_OFFSET,
    };

    api.connect().await?;
    let result = broadcast_inner(
        api,
        connector,
        device_id,
        currency_id,
        account,
        draft,
        &payment,
        &instructions,
        cancel,
    )
    .await;
    let disconnected = api.disconnect().await;
    let operation = result?;
    // The submission is irrevocable at this point; a teardown failure must
    // not make an on-ledger payment look failed.
    if let Err(err) = disconnected {
        warn!("disconnect failed after broadcast: {}", err);
    }

    recipients.evict(&draft.recipient).await;
    info!(id = %operation.id, hash = %operation.hash, "payment broadcast");
    Ok(operation)
}

#[allow(clippy::too_many_arguments)]
async fn broadcast_inner(
    api: &dyn LedgerApi,
    connector: &dyn DeviceConnector,
    device_id: &str,
    currency_id: &str,
    account: &Account,
    draft: &TransactionDraft,
    payment: &Payment,
    instructions: &PaymentInstructions,
    cancel: &CancelToken,
) -> Result<Operation> {
    let unsigned = api.prepare_payment(payment, instructions).await?;

    cancel.checkpoint()?;
    let path = account.fresh_address_path.clone();
    let currency = currency_id.to_string();
    let signed = with_session(connector, device_id, |session| async move {
        session.sign_transaction(&currency, &path, &unsigned).await
    })
    .await?;

    // Last bail-out point; once submitted the payment is irrevocable.
    cancel.checkpoint()?;
    let result = api.submit(&signed).await?;
    if !result.is_success() {
        warn!(code = %result.engine_result, "node rejected submission");
        return Err(Error::Submission {
            code: result.engine_result,
            message: result.message,
        });
    }

    let hash = canonical_tx_hash(&signed);
    Ok(pending_operation(account, draft, hash))
}

/// Canonical hash of a signed transaction blob: the first half of
/// SHA-512 over the transaction prefix and the blob, upper-case hex.
pub fn canonical_tx_hash(signed: &[u8]) -> String {
    let mut hasher = Sha512::new();
    hasher.update(TXN_HASH_PREFIX);
    hasher.update(signed);
    let digest = hasher.finalize();
    hex::encode_upper(&digest[..32])
}

/// Sequence the broadcast transaction most likely consumed. Best effort:
/// the caller's history may lag the ledger, and reconciliation corrects
/// any drift at the next sync.
fn predicted_sequence(account: &Account) -> u64 {
    let confirmed_out = account
        .operations
        .iter()
        .filter(|op| op.kind == OperationType::Out)
        .count() as u64;
    confirmed_out + account.pending_operations.len() as u64 + 1
}

fn pending_operation(account: &Account, draft: &TransactionDraft, hash: String) -> Operation {
    let fee = draft.fee.unwrap_or_default();
    Operation {
        id: Operation::operation_id(&account.id, &hash, OperationType::Out),
        hash,
        kind: OperationType::Out,
        value: draft.amount,
        fee,
        senders: vec![account.fresh_address.clone()],
        recipients: vec![draft.recipient.clone()],
        date: Utc::now(),
        sequence: predicted_sequence(account),
        block_height: None,
    }
}
