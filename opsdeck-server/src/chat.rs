//! Chat turn orchestration
//!
//! A turn writes the user message, replays the session log to the model and
//! writes the reply. The two inserts are separate commits: if the model call
//! fails the user message stays in the log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::db::{ChatMessage, ChatRepo, DbError, NewChatMessage};
use crate::llm::{CompletionRequest, LanguageModel, LlmError, LlmMessage};
use crate::models::{MessageContent, MessageRole, ModelName};

/// Message persistence needed by a chat turn
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn append_message(&self, message: NewChatMessage) -> Result<ChatMessage, DbError>;

    /// Messages of a session in conversation order
    async fn session_messages(&self, session_id: i32) -> Result<Vec<ChatMessage>, DbError>;
}

#[async_trait]
impl<'a> ChatStore for ChatRepo<'a> {
    async fn append_message(&self, message: NewChatMessage) -> Result<ChatMessage, DbError> {
        self.add_message(message).await
    }

    async fn session_messages(&self, session_id: i32) -> Result<Vec<ChatMessage>, DbError> {
        self.list_messages(session_id).await
    }
}

#[derive(Debug, Error)]
pub enum ChatTurnError {
    #[error("chat storage failed: {0}")]
    Store(#[from] DbError),

    #[error("chat completion failed: {0}")]
    Model(#[from] LlmError),
}

/// Result of one chat turn
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub response: String,
    pub tokens_used: i64,
    pub model: String,
}

/// Rough token count: a quarter of the characters of each side, rounded up.
pub fn estimate_tokens(user: &str, reply: &str) -> i64 {
    let quarter = |s: &str| (s.chars().count() as i64 + 3) / 4;
    quarter(user) + quarter(reply)
}

/// Title used when a session is created without one, e.g. `Chat 3/7/2026`.
pub fn default_session_title(now: DateTime<Utc>) -> String {
    format!("Chat {}", now.format("%-m/%-d/%Y"))
}

/// Run one turn against `session_id` and return the assistant reply.
pub async fn run_turn(
    store: &dyn ChatStore,
    llm: &dyn LanguageModel,
    session_id: i32,
    content: MessageContent,
    model: ModelName,
) -> Result<TurnOutcome, ChatTurnError> {
    let user_row = store
        .append_message(NewChatMessage {
            session_id,
            role: MessageRole::User,
            content: content.as_str().to_string(),
            model: Some(model.as_str().to_string()),
            tokens_used: None,
            cost: None,
        })
        .await?;

    let mut messages: Vec<LlmMessage> = store
        .session_messages(session_id)
        .await?
        .into_iter()
        .filter(|m| m.id != user_row.id)
        .map(|m| LlmMessage::new(m.role, m.content))
        .collect();
    messages.push(LlmMessage::user(content.as_str()));

    tracing::debug!(session_id, history = messages.len(), model = model.as_str(), "Chat turn");

    let request = CompletionRequest {
        model: model.as_str().to_string(),
        messages,
    };
    let reply = llm.complete(&request).await?;
    let tokens_used = estimate_tokens(content.as_str(), &reply);

    store
        .append_message(NewChatMessage {
            session_id,
            role: MessageRole::Assistant,
            content: reply.clone(),
            model: Some(model.as_str().to_string()),
            tokens_used: Some(tokens_used),
            cost: None,
        })
        .await?;

    Ok(TurnOutcome {
        response: reply,
        tokens_used,
        model: model.into_string(),
    })
}


#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::fakes::{EchoModel, MemoryStore};
    use super::*;

    fn content(s: &str) -> MessageContent {
        MessageContent::new(s).unwrap()
    }

    fn model() -> ModelName {
        ModelName::new("kimi-k2").unwrap()
    }

    #[test]
    fn token_estimate_rounds_each_side_up() {
        assert_eq!(estimate_tokens("", ""), 0);
        assert_eq!(estimate_tokens("hi", "hello"), 1 + 2);
        assert_eq!(estimate_tokens("abcd", "abcdefgh"), 1 + 2);
        // characters, not bytes
        assert_eq!(estimate_tokens("héllo", ""), 2);
    }

    #[test]
    fn default_title_uses_unpadded_date() {
        let now = Utc.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap();
        assert_eq!(default_session_title(now), "Chat 3/7/2026");
    }

    #[tokio::test]
    async fn turn_appends_user_then_assistant() {
        let store = MemoryStore::default();
        let llm = EchoModel::replying("hello");

        let outcome = run_turn(&store, &llm, 1, content("hi"), model())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            TurnOutcome {
                response: "hello".into(),
                tokens_used: 3,
                model: "kimi-k2".into(),
            }
        );

        let rows = store.rows.lock().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].role, MessageRole::User);
        assert_eq!(rows[0].content, "hi");
        assert_eq!(rows[0].tokens_used, None);
        assert_eq!(rows[1].role, MessageRole::Assistant);
        assert_eq!(rows[1].content, "hello");
        assert_eq!(rows[1].tokens_used, Some(3));
        assert_eq!(rows[1].model.as_deref(), Some("kimi-k2"));
    }

    #[tokio::test]
    async fn model_sees_prior_log_once_plus_new_message() {
        let store = MemoryStore::default();
        let first = EchoModel::replying("one");
        run_turn(&store, &first, 1, content("a"), model()).await.unwrap();

        let second = EchoModel::replying("two");
        run_turn(&store, &second, 1, content("b"), model()).await.unwrap();

        let seen = second.seen.lock().unwrap();
        let sent: Vec<(MessageRole, &str)> = seen[0]
            .messages
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect();
        assert_eq!(
            sent,
            vec![
                (MessageRole::User, "a"),
                (MessageRole::Assistant, "one"),
                (MessageRole::User, "b"),
            ]
        );
    }

    #[tokio::test]
    async fn failed_model_call_keeps_user_message() {
        let store = MemoryStore::default();
        let llm = EchoModel::failing("no key");

        let err = run_turn(&store, &llm, 1, content("hi"), model())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatTurnError::Model(_)));

        let rows = store.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = MemoryStore::default();
        run_turn(&store, &EchoModel::replying("x"), 1, content("a"), model())
            .await
            .unwrap();

        let llm = EchoModel::replying("y");
        run_turn(&store, &llm, 2, content("b"), model()).await.unwrap();
        assert_eq!(llm.seen.lock().unwrap()[0].messages.len(), 1);
    }
}
