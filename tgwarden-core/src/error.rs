use thiserror::Error;

#[derive(Error, Debug)]
pub enum WardenError {
    #[error("Client error: {0}")]
    Client(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Failures surfaced by a handler's `handle`. The router catches and logs
/// these; they never abort the dispatch pass.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Moderation error: {0}")]
    Moderation(String),

    #[error("Failed to send message to chat {0}")]
    SendFailed(i64),

    #[error("Failed to delete message {message_id} in chat {chat_id}")]
    DeleteFailed { chat_id: i64, message_id: i64 },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, WardenError>;
