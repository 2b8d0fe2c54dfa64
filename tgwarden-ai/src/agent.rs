//! Chat agent: system prompt + retrieved knowledge + bounded per-user
//! history, orchestrated around a [`ChatModel`].

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use tgwarden_kb::Retriever;

use crate::chat_model::{ChatModel, ChatResponse, ChatTurn};

/// Number of knowledge snippets merged into the model context.
const RAG_TOP_K: usize = 3;

type History = Arc<Mutex<Vec<ChatTurn>>>;

pub struct ChatAgent {
    chat_model: Arc<dyn ChatModel>,
    system_prompt: String,
    retriever: Option<Arc<dyn Retriever>>,
    /// Maximum retained exchanges per user (2 history entries each).
    max_history: usize,
    /// Conversation history per user. The per-user mutex serializes
    /// concurrent generate/append sequences for the same user arriving via
    /// different client connections.
    conversations: RwLock<HashMap<i64, History>>,
}

impl ChatAgent {
    pub fn new(
        chat_model: Arc<dyn ChatModel>,
        system_prompt: impl Into<String>,
        retriever: Option<Arc<dyn Retriever>>,
        max_history: usize,
    ) -> Self {
        let system_prompt = system_prompt.into();
        let prompt_prefix: String = system_prompt.chars().take(50).collect();
        info!(
            prompt_prefix = %prompt_prefix,
            rag = retriever.is_some(),
            max_history,
            "chat agent initialized"
        );
        Self {
            chat_model,
            system_prompt,
            retriever,
            max_history,
            conversations: RwLock::new(HashMap::new()),
        }
    }

    /// Generates a reply to `user_message`, maintaining that user's
    /// history. Escalated exchanges are not remembered.
    pub async fn generate_response(
        &self,
        user_message: &str,
        user_id: i64,
        clear_history: bool,
    ) -> ChatResponse {
        let cell = self.history_cell(user_id).await;
        // Held across generation and append: updates to one user's window
        // are serialized.
        let mut history = cell.lock().await;

        if clear_history {
            history.clear();
        }

        let rag_context = self.retrieve_context(user_message).await;

        let response = self
            .chat_model
            .generate(
                &self.system_prompt,
                user_message,
                &history,
                rag_context.as_deref(),
            )
            .await;

        if !response.should_escalate {
            history.push(ChatTurn::user(user_message));
            history.push(ChatTurn::assistant(&response.message));

            let cap = self.max_history * 2;
            if history.len() > cap {
                let excess = history.len() - cap;
                history.drain(..excess);
            }
        }

        response
    }

    /// Current history length for a user. Exposed for tests and metrics.
    pub async fn history_len(&self, user_id: i64) -> usize {
        match self.conversations.read().await.get(&user_id) {
            Some(cell) => cell.lock().await.len(),
            None => 0,
        }
    }

    async fn history_cell(&self, user_id: i64) -> History {
        if let Some(cell) = self.conversations.read().await.get(&user_id) {
            return cell.clone();
        }
        let mut map = self.conversations.write().await;
        map.entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(Vec::new())))
            .clone()
    }

    /// Fetches and formats the knowledge context block. Retrieval failures
    /// and empty results degrade silently to no context.
    async fn retrieve_context(&self, query: &str) -> Option<String> {
        let retriever = self.retriever.as_ref()?;

        debug!("retrieving relevant documents from knowledge base");
        let documents = match retriever.retrieve(query, RAG_TOP_K).await {
            Ok(docs) => docs,
            Err(e) => {
                warn!(error = %e, "knowledge retrieval failed, continuing without context");
                return None;
            }
        };

        if documents.is_empty() {
            return None;
        }

        debug!(count = documents.len(), "retrieved relevant documents");
        let block = documents
            .iter()
            .enumerate()
            .map(|(i, doc)| format!("[Document {}]\n{}", i + 1, doc.document))
            .collect::<Vec<_>>()
            .join("\n\n");
        Some(block)
    }
}
