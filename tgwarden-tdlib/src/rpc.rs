//! JSON RPC seam over a TDLib-style backend.

use async_trait::async_trait;
use serde_json::Value;

/// Request/response plus update-stream access to a TDLib-style backend.
///
/// `call` resolves with the backend's reply object or an error for both
/// transport failures and backend `error` replies. `next_update` yields raw
/// updates in arrival order; `None` means the connection is closed.
#[async_trait]
pub trait TdRpc: Send + Sync {
    async fn call(&self, method: &str, params: Value) -> anyhow::Result<Value>;

    async fn next_update(&self) -> Option<Value>;

    async fn close(&self);
}
