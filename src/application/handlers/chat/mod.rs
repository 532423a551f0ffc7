//! Chat handlers.

mod stream_chat;

pub use stream_chat::{
    ChatMode, StreamChatCommand, StreamChatConfig, StreamChatError, StreamChatHandler,
    StreamChatResult, TextStream,
};
