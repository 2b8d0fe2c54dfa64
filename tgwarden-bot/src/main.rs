//! Bot entrypoint: wires knowledge base, AI services, handlers, router and
//! Telegram clients, then runs until interrupted.

mod accounts;
mod lists;
mod settings;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use tgwarden_ai::{ChatAgent, ModerationService, SpeechToText};
use tgwarden_core::{init_tracing, ClientManager, EventRouter};
use tgwarden_handlers::{GroupModerationHandler, PmReplyHandler};
use tgwarden_kb::{EmbeddedVectorStore, FileTextSource, KbRetriever, KnowledgeBase};
use tgwarden_openai::{build_client, OpenAiChatModel, OpenAiEmbedding, OpenAiModeration, WhisperSpeech};
use tgwarden_tdlib::TdClient;

use accounts::{account_files, load_account, NameSequence};
use lists::{load_monitored_groups, load_monitored_users};
use settings::Settings;

const KB_CHUNK_SIZE: usize = 500;
const KB_CHUNK_OVERLAP: usize = 50;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    if let Some(parent) = Path::new(&settings.log_file).parent() {
        fs::create_dir_all(parent)?;
    }
    init_tracing(&settings.log_file)?;

    info!("starting Telegram AI agent bot");

    let monitored_users = load_monitored_users(&settings.monitored_users_file)?;
    let monitored_groups = load_monitored_groups(&settings.monitored_groups_file)?;

    // Knowledge base and retriever for PM replies.
    let system_prompt = fs::read_to_string(&settings.system_prompt_file)
        .with_context(|| format!("failed to read prompt file {}", settings.system_prompt_file))?;

    let openai = build_client(&settings.openai_api_key, settings.openai_base_url.as_deref());
    let embedder = Arc::new(OpenAiEmbedding::with_model(
        openai.clone(),
        settings.embedding_model.clone(),
    ));
    let kb = Arc::new(KnowledgeBase::new(
        Arc::new(FileTextSource::new(&settings.knowledge_base_file)),
        Arc::new(EmbeddedVectorStore::new(embedder)),
        KB_CHUNK_SIZE,
        KB_CHUNK_OVERLAP,
    ));
    let indexed = kb.build_index(settings.rebuild_kb).await?;
    info!(chunks = indexed, "knowledge base ready");

    // AI services.
    let chat_model = Arc::new(OpenAiChatModel::new(openai.clone(), settings.chat_model.clone()));
    let agent = Arc::new(ChatAgent::new(
        chat_model,
        system_prompt,
        Some(Arc::new(KbRetriever::new(kb))),
        settings.max_history,
    ));

    let moderation_model = Arc::new(OpenAiModeration::new(openai.clone()));
    let whisper_client = openai.clone();
    let moderation = Arc::new(ModerationService::with_speech_loader(
        moderation_model,
        Arc::new(move || {
            Ok(Arc::new(WhisperSpeech::new(whisper_client.clone())) as Arc<dyn SpeechToText>)
        }),
    ));

    // Handlers and router.
    let mut router = EventRouter::new();
    router.add_handler(Arc::new(PmReplyHandler::new(
        agent,
        monitored_users,
        settings.escalation_chat.clone(),
    )));
    router.add_handler(Arc::new(GroupModerationHandler::new(
        moderation,
        monitored_groups,
        settings.logs_chat.clone(),
        false,
    )));
    let router = Arc::new(router);

    // Telegram clients, one per account file.
    let mut manager = ClientManager::new();
    let mut names = NameSequence::new();
    for path in account_files(&settings.accounts_folder)? {
        let config = load_account(&path, &mut names, &settings.library_path)?;
        match TdClient::open(config.clone()) {
            Ok(client) => manager.add_client(&config.name, client),
            Err(err) => {
                error!(account = %config.name, error = %err, "failed to open client");
            }
        }
    }
    anyhow::ensure!(!manager.is_empty(), "no Telegram clients configured");

    manager.start_all().await;
    for (name, client) in manager.clients() {
        tokio::spawn(client.clone().listen(router.clone()));
        info!(client = %name, "connected to router");
    }

    info!("bot is running; press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;

    info!("stopping all clients");
    manager.stop_all().await;
    info!("shutdown complete");
    Ok(())
}
