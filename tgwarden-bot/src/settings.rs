//! Process-wide settings from the environment.

use std::env;

use anyhow::Result;
use tgwarden_core::Peer;

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Everything the bot reads from the environment at startup. Account
/// credentials live in per-account files, not here.
#[derive(Debug, Clone)]
pub struct Settings {
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub chat_model: String,
    pub embedding_model: String,
    pub system_prompt_file: String,
    pub knowledge_base_file: String,
    pub rebuild_kb: bool,
    pub accounts_folder: String,
    pub library_path: String,
    pub monitored_users_file: String,
    pub monitored_groups_file: String,
    /// Escalation notifications from the PM handler go here.
    pub escalation_chat: Option<Peer>,
    /// Moderation deletion records go here.
    pub logs_chat: Option<Peer>,
    pub max_history: usize,
    pub log_file: String,
}

impl Settings {
    /// Loads settings, requiring only `OPENAI_API_KEY`; everything else has
    /// a default.
    pub fn from_env() -> Result<Self> {
        let openai_api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not set"))?;

        let max_history = var_or("MAX_HISTORY", "3")
            .parse()
            .map_err(|_| anyhow::anyhow!("MAX_HISTORY must be a number"))?;

        Ok(Self {
            openai_api_key,
            openai_base_url: env::var("OPENAI_BASE_URL").ok(),
            chat_model: var_or("OPENAI_CHAT_MODEL", "gpt-4o-mini"),
            embedding_model: var_or("EMBEDDING_MODEL", "text-embedding-3-small"),
            system_prompt_file: var_or(
                "SYSTEM_PROMPT_FILE",
                "config/prompts/private_kb_responder.txt",
            ),
            knowledge_base_file: var_or("KNOWLEDGE_BASE_FILE", "data/knowledge_base.txt"),
            rebuild_kb: var_or("REBUILD_KB", "false").to_lowercase() == "true",
            accounts_folder: var_or("FOLDER_ACCOUNTS", "accounts"),
            library_path: var_or("LIBRARY_PATH", ""),
            monitored_users_file: var_or("MONITORED_USERS_FILE", "data/monitored_users.csv"),
            monitored_groups_file: var_or("MONITORED_GROUPS_FILE", "data/monitored_groups.csv"),
            escalation_chat: env::var("MODERATE_CHAT").ok().map(|s| Peer::parse(&s)),
            logs_chat: env::var("LOGS_CHAT").ok().map(|s| Peer::parse(&s)),
            max_history,
            log_file: var_or("LOG_FILE", "logs/tgwarden.log"),
        })
    }
}
