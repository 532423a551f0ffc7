//! StreamChatHandler - compiles the persona instruction and streams a reply.
//!
//! One request, one provider call: the instruction document is compiled
//! against a fresh clock, the key at the caller's index is used, and output
//! fragments are relayed as they arrive.

use futures::future;
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::adapters::ai::{KeyRotatingProvider, RotationError};
use crate::domain::foundation::{ErrorCode, ValidationError};
use crate::domain::persona::{
    authorize_turn, compile_group, compile_group_for_turn, compile_single, Character,
    InstructionDocument, RuntimeContext, TurnSignals, UserProfile,
};
use crate::ports::{AIError, CompletionRequest, Message, MessageRole, RequestMetadata};

/// Reply text fragments, in provider order.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, AIError>> + Send>>;

/// Who the user is talking to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMode {
    Single(Character),
    Group {
        members: Vec<Character>,
        consecutive_skips: u32,
    },
}

impl ChatMode {
    pub fn chat_type(&self) -> &'static str {
        match self {
            ChatMode::Single(_) => "single",
            ChatMode::Group { .. } => "group",
        }
    }

    pub fn roster_size(&self) -> usize {
        match self {
            ChatMode::Single(_) => 1,
            ChatMode::Group { members, .. } => members.len(),
        }
    }
}

/// Command to stream one reply.
#[derive(Debug, Clone)]
pub struct StreamChatCommand {
    pub mode: ChatMode,
    pub user_profile: UserProfile,
    /// Prior turns, oldest first.
    pub history: Vec<Message>,
    pub message: String,
    /// Slot in the configured key pool, chosen by the client.
    pub key_index: usize,
}

impl StreamChatCommand {
    /// Builds a command, rejecting an empty message or group roster.
    pub fn new(
        mode: ChatMode,
        user_profile: UserProfile,
        history: Vec<Message>,
        message: impl Into<String>,
        key_index: usize,
    ) -> Result<Self, ValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ValidationError::empty_field("message"));
        }
        if let ChatMode::Group { members, .. } = &mode {
            if members.is_empty() {
                return Err(ValidationError::empty_field("groupMembers"));
            }
        }

        Ok(Self {
            mode,
            user_profile,
            history,
            message,
            key_index,
        })
    }
}

/// Errors that can occur while starting a chat stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamChatError {
    #[error("Missing required chat parameters: {0}")]
    RequestMalformed(String),

    #[error("API key configuration is missing")]
    ConfigurationMissing,

    #[error("Invalid API key index {index} (pool has {pool_size} keys)")]
    InvalidCredentialIndex { index: usize, pool_size: usize },

    #[error("Invalid API key index {0}: must not be negative")]
    NegativeCredentialIndex(i64),

    #[error("Quota exceeded for API key {failed_index}")]
    QuotaExceeded { failed_index: usize },

    #[error("AI provider failed: {0}")]
    ProviderUnavailable(String),
}

impl StreamChatError {
    /// Wire code for the error response.
    pub fn code(&self) -> ErrorCode {
        match self {
            StreamChatError::RequestMalformed(_) => ErrorCode::MissingChatParameters,
            StreamChatError::ConfigurationMissing => ErrorCode::ConfigurationMissing,
            StreamChatError::InvalidCredentialIndex { .. }
            | StreamChatError::NegativeCredentialIndex(_) => ErrorCode::InvalidKeyIndex,
            StreamChatError::QuotaExceeded { .. } => ErrorCode::QuotaExceeded,
            StreamChatError::ProviderUnavailable(_) => ErrorCode::InternalError,
        }
    }

    /// Index to report back when the client should rotate keys.
    pub fn failed_key_index(&self) -> Option<usize> {
        match self {
            StreamChatError::QuotaExceeded { failed_index } => Some(*failed_index),
            _ => None,
        }
    }
}

impl From<ValidationError> for StreamChatError {
    fn from(err: ValidationError) -> Self {
        StreamChatError::RequestMalformed(err.to_string())
    }
}

impl From<RotationError> for StreamChatError {
    fn from(err: RotationError) -> Self {
        match err {
            RotationError::ConfigurationMissing => StreamChatError::ConfigurationMissing,
            RotationError::InvalidCredentialIndex { index, pool_size } => {
                StreamChatError::InvalidCredentialIndex { index, pool_size }
            }
            RotationError::QuotaExceeded { failed_index } => {
                StreamChatError::QuotaExceeded { failed_index }
            }
            RotationError::ProviderUnavailable(message) => {
                StreamChatError::ProviderUnavailable(message)
            }
        }
    }
}

/// Result of starting a chat stream.
pub struct StreamChatResult {
    pub trace_id: String,
    pub stream: TextStream,
}

/// Settings applied to every chat request.
#[derive(Debug, Clone, Copy)]
pub struct StreamChatConfig {
    /// Offset of the wall clock shown to the model.
    pub utc_offset_minutes: i32,
    /// Allow the model to ground answers with web search.
    pub enable_search: bool,
}

impl Default for StreamChatConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 330,
            enable_search: true,
        }
    }
}

/// Handler for streaming chat replies.
pub struct StreamChatHandler {
    provider: Arc<KeyRotatingProvider>,
    config: StreamChatConfig,
}

impl StreamChatHandler {
    pub fn new(provider: Arc<KeyRotatingProvider>, config: StreamChatConfig) -> Self {
        Self { provider, config }
    }

    /// Compiles the instruction document for a command at a given clock.
    pub fn compile(cmd: &StreamChatCommand, runtime: &RuntimeContext) -> InstructionDocument {
        match &cmd.mode {
            ChatMode::Single(character) => compile_single(character, &cmd.user_profile, runtime),
            ChatMode::Group {
                members,
                consecutive_skips,
            } => {
                let signals = TurnSignals::from_message(&cmd.message, members);
                if signals.is_decisive() {
                    let decision = authorize_turn(members, &signals);
                    tracing::debug!(speakers = ?decision.speakers(), "Turn authorization decided");
                    compile_group_for_turn(
                        members,
                        &cmd.user_profile,
                        *consecutive_skips,
                        runtime,
                        &decision,
                    )
                } else {
                    compile_group(members, &cmd.user_profile, *consecutive_skips, runtime)
                }
            }
        }
    }

    pub async fn handle(&self, cmd: StreamChatCommand) -> Result<StreamChatResult, StreamChatError> {
        let trace_id = Uuid::new_v4().to_string();
        let chat_type = cmd.mode.chat_type();

        tracing::info!(
            trace_id = %trace_id,
            chat_type,
            roster_size = cmd.mode.roster_size(),
            key_index = cmd.key_index,
            history_len = cmd.history.len(),
            "Handling chat request"
        );

        let runtime = RuntimeContext::capture(self.config.utc_offset_minutes);
        let instruction = Self::compile(&cmd, &runtime);

        let request = CompletionRequest::new(RequestMetadata::new(trace_id.clone(), chat_type))
            .with_system_prompt(instruction.into_string())
            .with_messages(cmd.history)
            .with_message(MessageRole::User, cmd.message)
            .with_search(self.config.enable_search);

        let upstream = self.provider.invoke(cmd.key_index, request).await?;

        let log_trace = trace_id.clone();
        let stream = upstream.filter_map(move |item| {
            let out = match item {
                Ok(chunk) => {
                    if let Some(usage) = &chunk.usage {
                        tracing::info!(
                            trace_id = %log_trace,
                            prompt_tokens = usage.prompt_tokens,
                            completion_tokens = usage.completion_tokens,
                            "Chat stream completed"
                        );
                    }
                    if chunk.delta.is_empty() {
                        None
                    } else {
                        Some(Ok(chunk.delta))
                    }
                }
                Err(err) => {
                    tracing::warn!(trace_id = %log_trace, error = %err, "Chat stream aborted mid-response");
                    Some(Err(err))
                }
            };
            future::ready(out)
        });

        Ok(StreamChatResult {
            trace_id,
            stream: Box::pin(stream),
        })
    }
}
