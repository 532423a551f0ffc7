//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod access;
pub mod chat;

pub use access::{ValidateAccessCodeCommand, ValidateAccessCodeHandler};
pub use chat::{
    ChatMode, StreamChatCommand, StreamChatConfig, StreamChatError, StreamChatHandler,
    StreamChatResult, TextStream,
};
