//! TDLib-backed [`TelegramClient`] implementation.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use tgwarden_core::router::EventRouter;
use tgwarden_core::{ClientHandle, HistoryQuery, ParseMode, Peer, TelegramClient};

use crate::config::TdConfig;
use crate::rpc::TdRpc;
use crate::tdjson::TdJsonRpc;

/// Authorization steps are bounded; a flow that does not converge is a
/// failed start, not a hang.
const MAX_AUTH_STEPS: usize = 20;

/// One Telegram account connected through TDLib.
pub struct TdClient {
    config: TdConfig,
    rpc: Arc<dyn TdRpc>,
}

impl TdClient {
    /// Opens the tdjson library named in the config and wraps it.
    pub fn open(config: TdConfig) -> anyhow::Result<Arc<Self>> {
        let rpc = TdJsonRpc::open(&config.library_path)?;
        Ok(Arc::new(Self { config, rpc }))
    }

    /// Builds a client over an existing RPC connection.
    pub fn with_rpc(config: TdConfig, rpc: Arc<dyn TdRpc>) -> Arc<Self> {
        Arc::new(Self { config, rpc })
    }

    /// Drives the authorization state machine until the session is ready.
    async fn authorize(&self) -> anyhow::Result<()> {
        for _ in 0..MAX_AUTH_STEPS {
            let state = self.rpc.call("getAuthorizationState", json!({})).await?;
            let state_type = state.get("@type").and_then(Value::as_str).unwrap_or("");

            match state_type {
                "authorizationStateReady" => return Ok(()),
                "authorizationStateWaitTdlibParameters" => {
                    self.rpc
                        .call(
                            "setTdlibParameters",
                            json!({
                                "use_test_dc": false,
                                "database_directory": format!("{}/database", self.config.files_directory),
                                "files_directory": format!("{}/files", self.config.files_directory),
                                "database_encryption_key": BASE64.encode(&self.config.db_enc_key),
                                "use_file_database": true,
                                "use_chat_info_database": true,
                                "use_message_database": true,
                                "use_secret_chats": false,
                                "api_id": self.config.api_id,
                                "api_hash": self.config.api_hash,
                                "system_language_code": "en",
                                "device_model": "Desktop",
                                "application_version": env!("CARGO_PKG_VERSION"),
                            }),
                        )
                        .await?;
                }
                "authorizationStateWaitEncryptionKey" => {
                    self.rpc
                        .call(
                            "checkDatabaseEncryptionKey",
                            json!({ "encryption_key": BASE64.encode(&self.config.db_enc_key) }),
                        )
                        .await?;
                }
                "authorizationStateWaitPhoneNumber" => {
                    self.rpc
                        .call(
                            "setAuthenticationPhoneNumber",
                            json!({ "phone_number": self.config.phone }),
                        )
                        .await?;
                }
                "authorizationStateWaitCode" => {
                    let code = prompt(&format!("Login code for {}: ", self.config.name)).await?;
                    self.rpc
                        .call("checkAuthenticationCode", json!({ "code": code }))
                        .await?;
                }
                "authorizationStateWaitPassword" => {
                    let password =
                        prompt(&format!("2FA password for {}: ", self.config.name)).await?;
                    self.rpc
                        .call("checkAuthenticationPassword", json!({ "password": password }))
                        .await?;
                }
                "authorizationStateClosed" => {
                    anyhow::bail!("connection closed during authorization");
                }
                other => {
                    anyhow::bail!("unsupported authorization state: {other}");
                }
            }
        }
        anyhow::bail!("authorization did not converge")
    }

    /// Resolves a peer to a backend chat id.
    ///
    /// Usernames go through public chat search. Numeric ids are probed in
    /// several shapes, since callers pass both bare group ids and the
    /// `-100`-prefixed supergroup form; the first shape the backend accepts
    /// wins.
    async fn resolve_peer(&self, peer: &Peer) -> Option<i64> {
        match peer {
            Peer::Username(username) => {
                match self
                    .rpc
                    .call("searchPublicChat", json!({ "username": username }))
                    .await
                {
                    Ok(chat) => chat.get("id").and_then(Value::as_i64),
                    Err(err) => {
                        error!(username, error = %err, "failed to resolve username");
                        None
                    }
                }
            }
            Peer::Id(peer_id) => {
                let abs = peer_id.abs();
                let supergroup_form = if abs.to_string().starts_with("100") {
                    -abs
                } else {
                    format!("-100{abs}").parse::<i64>().ok()?
                };

                let mut variants = vec![*peer_id, abs, -abs, supergroup_form];
                let mut seen = Vec::new();
                variants.retain(|v| {
                    if seen.contains(v) {
                        false
                    } else {
                        seen.push(*v);
                        true
                    }
                });

                for chat_id in variants {
                    if self
                        .rpc
                        .call("getChat", json!({ "chat_id": chat_id }))
                        .await
                        .is_ok()
                    {
                        debug!(peer = %peer, chat_id, "resolved peer");
                        return Some(chat_id);
                    }
                }
                error!(peer = %peer, "failed to resolve peer");
                None
            }
        }
    }

    /// Builds the `inputMessageText` payload, running the text through
    /// `parseTextEntities` when a parse mode is requested. Entity parse
    /// failures degrade to plain text.
    async fn message_content(&self, text: &str, parse_mode: Option<ParseMode>) -> Value {
        let plain = json!({
            "@type": "formattedText",
            "text": text,
            "entities": []
        });

        let formatted = match parse_mode {
            None => plain,
            Some(mode) => {
                let parse_type = match mode {
                    ParseMode::Html => "textParseModeHTML",
                    ParseMode::Markdown => "textParseModeMarkdown",
                };
                match self
                    .rpc
                    .call(
                        "parseTextEntities",
                        json!({
                            "text": text,
                            "parse_mode": { "@type": parse_type }
                        }),
                    )
                    .await
                {
                    Ok(parsed) => parsed,
                    Err(err) => {
                        warn!(error = %err, "failed to parse entities, sending plain text");
                        plain
                    }
                }
            }
        };

        json!({
            "@type": "inputMessageText",
            "text": formatted
        })
    }
}

/// Interactive login prompt used during first authorization.
async fn prompt(label: &str) -> anyhow::Result<String> {
    let label = label.to_string();
    tokio::task::spawn_blocking(move || {
        print!("{label}");
        std::io::stdout().flush()?;
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        Ok(line.trim().to_string())
    })
    .await?
}

#[async_trait]
impl TelegramClient for TdClient {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn start(&self) -> bool {
        info!(client = %self.config.name, "starting TDLib client");
        match self.authorize().await {
            Ok(()) => {
                info!(client = %self.config.name, "TDLib client started");
                true
            }
            Err(err) => {
                error!(client = %self.config.name, error = %err, "failed to start TDLib client");
                false
            }
        }
    }

    async fn stop(&self) -> bool {
        info!(client = %self.config.name, "stopping TDLib client");
        self.rpc.close().await;
        true
    }

    async fn send_message(
        &self,
        peer: &Peer,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Option<Value> {
        let chat_id = self.resolve_peer(peer).await?;
        let content = self.message_content(text, parse_mode).await;

        match self
            .rpc
            .call(
                "sendMessage",
                json!({
                    "chat_id": chat_id,
                    "input_message_content": content
                }),
            )
            .await
        {
            Ok(message) => {
                info!(chat_id, "message sent");
                Some(message)
            }
            Err(err) => {
                error!(chat_id, error = %err, "failed to send message");
                None
            }
        }
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64, revoke: bool) -> bool {
        match self
            .rpc
            .call(
                "deleteMessages",
                json!({
                    "chat_id": chat_id,
                    "message_ids": [message_id],
                    "revoke": revoke
                }),
            )
            .await
        {
            Ok(_) => {
                info!(chat_id, message_id, "message deleted");
                true
            }
            Err(err) => {
                error!(chat_id, message_id, error = %err, "failed to delete message");
                false
            }
        }
    }

    async fn get_me(&self) -> Option<Value> {
        match self.rpc.call("getMe", json!({})).await {
            Ok(user) => Some(user),
            Err(err) => {
                error!(error = %err, "failed to get own account");
                None
            }
        }
    }

    async fn get_user(&self, peer: &Peer) -> Option<Value> {
        let user_id = self.resolve_peer(peer).await?;
        match self.rpc.call("getUser", json!({ "user_id": user_id })).await {
            Ok(user) => Some(user),
            Err(err) => {
                error!(user_id, error = %err, "failed to get user");
                None
            }
        }
    }

    async fn get_chat(&self, peer: &Peer) -> Option<Value> {
        let chat_id = self.resolve_peer(peer).await?;
        match self.rpc.call("getChat", json!({ "chat_id": chat_id })).await {
            Ok(chat) => Some(chat),
            Err(err) => {
                error!(chat_id, error = %err, "failed to get chat");
                None
            }
        }
    }

    async fn get_message(&self, chat_id: i64, message_id: i64) -> Option<Value> {
        match self
            .rpc
            .call(
                "getMessage",
                json!({ "chat_id": chat_id, "message_id": message_id }),
            )
            .await
        {
            Ok(message) => Some(message),
            Err(err) => {
                warn!(chat_id, message_id, error = %err, "failed to get message");
                None
            }
        }
    }

    async fn get_history(&self, peer: &Peer, query: HistoryQuery) -> Option<Vec<Value>> {
        let chat_id = self.resolve_peer(peer).await?;
        match self
            .rpc
            .call(
                "getChatHistory",
                json!({
                    "chat_id": chat_id,
                    "from_message_id": query.from_message_id,
                    "offset": query.offset,
                    "limit": query.limit,
                    "only_local": query.only_local
                }),
            )
            .await
        {
            Ok(result) => {
                let messages = result
                    .get("messages")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                info!(chat_id, count = messages.len(), "retrieved chat history");
                Some(messages)
            }
            Err(err) => {
                error!(chat_id, error = %err, "failed to get chat history");
                None
            }
        }
    }

    /// Two-step download: ask for the file record, trigger a synchronous
    /// download when the local copy is incomplete, then read the local path.
    async fn download_file(&self, file_id: i64) -> Option<Vec<u8>> {
        let file = match self.rpc.call("getFile", json!({ "file_id": file_id })).await {
            Ok(file) => file,
            Err(err) => {
                error!(file_id, error = %err, "failed to get file info");
                return None;
            }
        };

        let completed = file
            .pointer("/local/is_downloading_completed")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let file = if completed {
            file
        } else {
            match self
                .rpc
                .call(
                    "downloadFile",
                    json!({
                        "file_id": file_id,
                        "priority": 1,
                        "offset": 0,
                        "limit": 0,
                        "synchronous": true
                    }),
                )
                .await
            {
                Ok(file) => file,
                Err(err) => {
                    error!(file_id, error = %err, "failed to download file");
                    return None;
                }
            }
        };

        let path = file.pointer("/local/path").and_then(Value::as_str)?;
        if path.is_empty() {
            warn!(file_id, "downloaded file has no local path");
            return None;
        }

        match tokio::fs::read(path).await {
            Ok(bytes) => {
                debug!(file_id, size = bytes.len(), "file downloaded");
                Some(bytes)
            }
            Err(err) => {
                error!(file_id, path, error = %err, "failed to read downloaded file");
                None
            }
        }
    }

    async fn listen(self: Arc<Self>, router: Arc<EventRouter>) {
        info!(client = %self.config.name, "update pump started");
        while let Some(update) = self.rpc.next_update().await {
            router
                .route(update, ClientHandle::new(self.clone()))
                .await;
        }
        info!(client = %self.config.name, "update pump stopped");
    }
}
