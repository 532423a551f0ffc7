//! Application layer - Commands and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    ChatMode, StreamChatCommand, StreamChatConfig, StreamChatError, StreamChatHandler,
    StreamChatResult, TextStream, ValidateAccessCodeCommand, ValidateAccessCodeHandler,
};
