//! `td_json_client` binding loaded at runtime.
//!
//! The shared library is resolved with `libloading` so deployments can point
//! at their own tdjson build. Requests are correlated with responses through
//! the `@extra` field; everything without `@extra` is an update and goes to
//! the update channel consumed by [`TdRpc::next_update`].

use std::collections::HashMap;
use std::ffi::{c_char, c_void, CStr, CString};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use libloading::Library;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, trace, warn};
use uuid::Uuid;

use crate::rpc::TdRpc;

type CreateFn = unsafe extern "C" fn() -> *mut c_void;
type SendFn = unsafe extern "C" fn(*mut c_void, *const c_char);
type ReceiveFn = unsafe extern "C" fn(*mut c_void, f64) -> *const c_char;
type DestroyFn = unsafe extern "C" fn(*mut c_void);

const RECEIVE_TIMEOUT_SECS: f64 = 10.0;
const CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Raw tdjson client pointer. tdjson allows `send` from any thread;
/// `receive` happens only on the dedicated reader thread.
struct RawClient(*mut c_void);

unsafe impl Send for RawClient {}
unsafe impl Sync for RawClient {}

/// [`TdRpc`] implementation over a dynamically loaded tdjson library.
pub struct TdJsonRpc {
    // Keeps the shared library mapped for the lifetime of the client.
    _library: Library,
    client: RawClient,
    send_fn: SendFn,
    destroy_fn: DestroyFn,
    pending: Arc<Mutex<HashMap<String, oneshot::Sender<Value>>>>,
    updates: tokio::sync::Mutex<mpsc::UnboundedReceiver<Value>>,
    closed: Arc<AtomicBool>,
    reader: Mutex<Option<std::thread::JoinHandle<()>>>,
}

impl TdJsonRpc {
    /// Loads the tdjson library, creates a client and starts the reader
    /// thread.
    pub fn open(library_path: &str) -> anyhow::Result<Arc<Self>> {
        // Symbol resolution against an arbitrary user-supplied library.
        let (library, client, send_fn, receive_fn, destroy_fn) = unsafe {
            let library = Library::new(library_path)?;
            let create: CreateFn = *library.get(b"td_json_client_create")?;
            let send: SendFn = *library.get(b"td_json_client_send")?;
            let receive: ReceiveFn = *library.get(b"td_json_client_receive")?;
            let destroy: DestroyFn = *library.get(b"td_json_client_destroy")?;
            let client = create();
            (library, client, send, receive, destroy)
        };

        let pending: Arc<Mutex<HashMap<String, oneshot::Sender<Value>>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let closed = Arc::new(AtomicBool::new(false));

        let reader_client = RawClient(client);
        let reader_pending = pending.clone();
        let reader_closed = closed.clone();
        let reader = std::thread::Builder::new()
            .name("tdjson-receive".to_string())
            .spawn(move || {
                receive_loop(reader_client, receive_fn, reader_pending, update_tx, reader_closed);
            })?;

        Ok(Arc::new(Self {
            _library: library,
            client: RawClient(client),
            send_fn,
            destroy_fn,
            pending,
            updates: tokio::sync::Mutex::new(update_rx),
            closed,
            reader: Mutex::new(Some(reader)),
        }))
    }

    fn send_raw(&self, payload: &Value) -> anyhow::Result<()> {
        let serialized = serde_json::to_string(payload)?;
        trace!(request = %serialized, "tdjson send");
        let cstring = CString::new(serialized)?;
        unsafe { (self.send_fn)(self.client.0, cstring.as_ptr()) };
        Ok(())
    }
}

fn receive_loop(
    client: RawClient,
    receive_fn: ReceiveFn,
    pending: Arc<Mutex<HashMap<String, oneshot::Sender<Value>>>>,
    updates: mpsc::UnboundedSender<Value>,
    closed: Arc<AtomicBool>,
) {
    loop {
        if closed.load(Ordering::SeqCst) {
            return;
        }

        let raw = unsafe { (receive_fn)(client.0, RECEIVE_TIMEOUT_SECS) };
        if raw.is_null() {
            continue;
        }
        // The string is owned by tdjson and valid until the next receive
        // call on this thread; copy it out immediately.
        let text = unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned();

        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "dropping unparseable tdjson payload");
                continue;
            }
        };

        if let Some(extra) = value.get("@extra").and_then(Value::as_str) {
            let sender = pending.lock().ok().and_then(|mut map| map.remove(extra));
            match sender {
                Some(sender) => {
                    let _ = sender.send(value);
                }
                None => warn!(extra, "response for unknown request"),
            }
            continue;
        }

        if value.pointer("/authorization_state/@type").and_then(Value::as_str)
            == Some("authorizationStateClosed")
        {
            closed.store(true, Ordering::SeqCst);
        }

        if updates.send(value).is_err() {
            // Receiver dropped; nothing left to deliver to.
            return;
        }
    }
}

#[async_trait]
impl TdRpc for TdJsonRpc {
    async fn call(&self, method: &str, params: Value) -> anyhow::Result<Value> {
        let extra = Uuid::new_v4().to_string();

        let mut payload = match params {
            Value::Object(map) => map,
            Value::Null => serde_json::Map::new(),
            other => anyhow::bail!("request params must be an object, got {other}"),
        };
        payload.insert("@type".to_string(), Value::String(method.to_string()));
        payload.insert("@extra".to_string(), Value::String(extra.clone()));

        let (tx, rx) = oneshot::channel();
        if let Ok(mut map) = self.pending.lock() {
            map.insert(extra.clone(), tx);
        }

        if let Err(err) = self.send_raw(&Value::Object(payload)) {
            if let Ok(mut map) = self.pending.lock() {
                map.remove(&extra);
            }
            return Err(err);
        }

        let response = match tokio::time::timeout(CALL_TIMEOUT, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => anyhow::bail!("{method}: connection closed"),
            Err(_) => {
                if let Ok(mut map) = self.pending.lock() {
                    map.remove(&extra);
                }
                anyhow::bail!("{method}: timed out");
            }
        };

        if response.get("@type").and_then(Value::as_str) == Some("error") {
            let code = response.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = response
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            debug!(method, code, message, "tdjson error reply");
            anyhow::bail!("{method} failed: {code} {message}");
        }

        Ok(response)
    }

    async fn next_update(&self) -> Option<Value> {
        self.updates.lock().await.recv().await
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(err) = self.send_raw(&serde_json::json!({ "@type": "close" })) {
            error!(error = %err, "failed to send close request");
        }
    }
}

impl Drop for TdJsonRpc {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
        // The client must outlive any in-flight receive on the reader
        // thread.
        if let Ok(mut reader) = self.reader.lock() {
            if let Some(handle) = reader.take() {
                let _ = handle.join();
            }
        }
        unsafe { (self.destroy_fn)(self.client.0) };
    }
}
