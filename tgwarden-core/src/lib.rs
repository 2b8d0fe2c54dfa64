//! # tgwarden-core
//!
//! Core types and traits for the Telegram agent bot: the normalized event
//! model, the event normalizer, the [`EventRouter`], the [`EventHandler`]
//! capability trait, the [`TelegramClient`] abstraction, the multi-account
//! [`ClientManager`], and tracing initialization. Transport-agnostic; used
//! by the handler, AI and client crates.

pub mod client;
pub mod error;
pub mod events;
pub mod handler;
pub mod logger;
pub mod manager;
pub mod normalizer;
pub mod router;

pub use client::{ClientHandle, HistoryQuery, ParseMode, Peer, TelegramClient};
pub use error::{HandlerError, Result, WardenError};
pub use events::{
    ChatActionEvent, ChatType, Event, MediaInfo, MessageEvent, SenderInfo, UserStatusEvent,
};
pub use handler::EventHandler;
pub use logger::init_tracing;
pub use manager::ClientManager;
pub use router::EventRouter;
