//! # tgwarden-tdlib
//!
//! TDLib transport for the bot: the [`TdRpc`] JSON request/response seam,
//! the [`TdJsonRpc`] binding that loads `tdjson` at runtime, and
//! [`TdClient`], the [`tgwarden_core::TelegramClient`] implementation with
//! peer resolution, formatted sends, two-step downloads and the update
//! pump.

pub mod client;
pub mod config;
pub mod rpc;
pub mod tdjson;

pub use client::TdClient;
pub use config::TdConfig;
pub use rpc::TdRpc;
pub use tdjson::TdJsonRpc;
