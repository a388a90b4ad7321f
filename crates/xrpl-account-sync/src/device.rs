//! Hardware signing device surface
//!
//! Devices hand out addresses for derivation paths and sign prepared
//! transaction blobs. Sessions are exclusive handles that must be closed on
//! every exit path; [`with_session`] scopes that for callers.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// An open, exclusive session with a signing device.
#[async_trait]
pub trait DeviceSession: Send + Sync {
    /// Derive and return the classic address at `path` for `currency_id`.
    async fn get_address(&self, currency_id: &str, path: &str) -> Result<String>;

    /// Sign a prepared transaction blob with the key at `path`.
    async fn sign_transaction(&self, currency_id: &str, path: &str, payload: &[u8])
        -> Result<Vec<u8>>;

    /// Release the device. Must be called exactly once per session.
    async fn close(&self) -> Result<()>;
}

/// Opens sessions against a physical or emulated device.
#[async_trait]
pub trait DeviceConnector: Send + Sync {
    /// Open an exclusive session with the identified device.
    async fn open(&self, device_id: &str) -> Result<Box<dyn DeviceSession>>;
}

/// Run `f` with an open device session, closing the session on every exit
/// path. The closure's error is preferred over a close failure.
pub async fn with_session<T, F, Fut>(
    connector: &dyn DeviceConnector,
    device_id: &str,
    f: F,
) -> Result<T>
where
    F: FnOnce(Arc<dyn DeviceSession>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let session: Arc<dyn DeviceSession> = Arc::from(connector.open(device_id).await?);
    let result = f(Arc::clone(&session)).await;
    let closed = session.close().await;
    match result {
        Ok(value) => {
            closed?;
            Ok(value)
        }
        Err(err) => {
            if let Err(close_err) = closed {
                tracing::warn!("device close failed after error: {}", close_err);
            }
            Err(err)
        }
    }
}
