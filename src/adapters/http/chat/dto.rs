//! HTTP DTOs for the chat endpoint.
//!
//! The request mirrors what the browser client sends; it is turned into a
//! `StreamChatCommand` only after the per-chat-type fields are checked.

use serde::{Deserialize, Serialize};

use crate::application::handlers::chat::{ChatMode, StreamChatCommand, StreamChatError};
use crate::domain::persona::{Character, UserProfile};
use crate::ports::{Message, MessageRole};

/// Message returned when the persona or user profile is absent.
pub const MISSING_PARAMETERS_MESSAGE: &str =
    "Missing required chat parameters. (Chat profile data not sent).";

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Single,
    Group,
}

/// One text part of a history turn.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryPart {
    #[serde(default)]
    pub text: String,
}

/// A prior turn in provider wire shape.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    pub role: MessageRole,
    #[serde(default)]
    pub parts: Vec<HistoryPart>,
}

impl From<HistoryEntry> for Message {
    fn from(entry: HistoryEntry) -> Self {
        let text: String = entry.parts.into_iter().map(|p| p.text).collect();
        Message::new(entry.role, text)
    }
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub chat_type: Option<ChatType>,
    #[serde(default)]
    pub character: Option<Character>,
    #[serde(default)]
    pub group_members: Option<Vec<Character>>,
    #[serde(default)]
    pub user_profile: Option<UserProfile>,
    #[serde(default)]
    pub consecutive_skips: u32,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub message: String,
    /// Signed so a negative index is reported as a bad key index, not bad JSON.
    #[serde(default)]
    pub key_index: i64,
}

impl ChatRequest {
    /// Checks the fields the chat type needs and builds the command.
    pub fn into_command(self) -> Result<StreamChatCommand, StreamChatError> {
        let missing = || StreamChatError::RequestMalformed(MISSING_PARAMETERS_MESSAGE.to_string());

        let chat_type = self.chat_type.ok_or_else(missing)?;
        let user_profile = self.user_profile.ok_or_else(missing)?;
        let key_index = usize::try_from(self.key_index)
            .map_err(|_| StreamChatError::NegativeCredentialIndex(self.key_index))?;
        let mode = match chat_type {
            ChatType::Single => ChatMode::Single(self.character.ok_or_else(missing)?),
            ChatType::Group => ChatMode::Group {
                members: self.group_members.ok_or_else(missing)?,
                consecutive_skips: self.consecutive_skips,
            },
        };
        let history = self.history.into_iter().map(Message::from).collect();

        Ok(StreamChatCommand::new(
            mode,
            user_profile,
            history,
            self.message,
            key_index,
        )?)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Error body for chat failures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Machine-readable code, e.g. `QUOTA_EXCEEDED`.
    pub error: String,
    pub message: String,
    /// Key slot that ran out of quota; the client advances past it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_key_index: Option<usize>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            failed_key_index: None,
        }
    }
}

impl From<&StreamChatError> for ErrorResponse {
    fn from(err: &StreamChatError) -> Self {
        let message = match err {
            StreamChatError::RequestMalformed(message) => message.clone(),
            other => other.to_string(),
        };
        Self {
            error: err.code().to_string(),
            message,
            failed_key_index: err.failed_key_index(),
        }
    }
}
