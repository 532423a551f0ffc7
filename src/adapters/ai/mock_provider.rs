//! Mock AI Provider for testing.
//!
//! Provides a configurable mock implementation of the AIProvider port,
//! allowing tests to run without calling the real model API.
//!
//! # Features
//!
//! - Scripted chunk sequences
//! - Error injection before the stream, as its first item, or mid-stream
//! - Channel-driven streams for observing incremental delivery
//! - Call tracking, including which key slot was used
//!
//! # Example
//!
//! ```ignore
//! let provider = MockAIProvider::new().with_chunks(["Hel", "lo"]);
//! let stream = provider.stream_complete(&credential, request).await?;
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

use crate::domain::credentials::ApiCredential;
use crate::ports::{
    AIError, AIProvider, ChatStream, CompletionRequest, FinishReason, ProviderInfo, StreamChunk,
    TokenUsage,
};

/// Sender half for a channel-driven mock stream.
pub type MockStreamSender = mpsc::UnboundedSender<Result<StreamChunk, AIError>>;

/// Mock AI provider for testing.
///
/// Responses are consumed in order; once the queue is empty every call
/// streams a single default fragment.
#[derive(Debug, Clone)]
pub struct MockAIProvider {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    info: ProviderInfo,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

/// A configured mock response.
#[derive(Debug)]
pub enum MockResponse {
    /// Stream these fragments, then a final chunk.
    Chunks(Vec<String>),
    /// Fail before any stream is returned.
    Error(MockError),
    /// Return a stream whose first item is this error.
    FirstItemError(MockError),
    /// Stream these fragments, then fail.
    FailAfter(Vec<String>, MockError),
    /// Stream whatever the test sends; ends when the sender is dropped.
    Channel(mpsc::UnboundedReceiver<Result<StreamChunk, AIError>>),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    /// Simulate quota exhaustion (HTTP 429).
    RateLimited { message: String },
    ContentFiltered { reason: String },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    Timeout { timeout_secs: u64 },
}

impl From<MockError> for AIError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { message } => AIError::rate_limited(message),
            MockError::ContentFiltered { reason } => AIError::content_filtered(reason),
            MockError::Unavailable { message } => AIError::unavailable(message),
            MockError::AuthenticationFailed => AIError::AuthenticationFailed,
            MockError::Network { message } => AIError::network(message),
            MockError::Timeout { timeout_secs } => AIError::Timeout { timeout_secs },
        }
    }
}

/// One recorded invocation.
#[derive(Debug, Clone)]
pub struct MockCall {
    /// The key the call was authenticated with.
    pub api_key: String,
    pub request: CompletionRequest,
}

impl Default for MockAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockAIProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn push(self, response: MockResponse) -> Self {
        lock(&self.responses).push_back(response);
        self
    }

    /// Adds a response that streams `chunks` in order.
    pub fn with_chunks<I, S>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(MockResponse::Chunks(chunks.into_iter().map(Into::into).collect()))
    }

    /// Adds a single-fragment response.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.with_chunks([content.into()])
    }

    /// Adds a failure raised before streaming starts.
    pub fn with_error(self, error: MockError) -> Self {
        self.push(MockResponse::Error(error))
    }

    /// Adds a stream whose first item is `error`.
    pub fn with_first_item_error(self, error: MockError) -> Self {
        self.push(MockResponse::FirstItemError(error))
    }

    /// Adds a stream that yields `chunks` and then fails.
    pub fn with_error_after<I, S>(self, chunks: I, error: MockError) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(MockResponse::FailAfter(
            chunks.into_iter().map(Into::into).collect(),
            error,
        ))
    }

    /// Adds a stream fed by the returned sender.
    pub fn with_channel(self) -> (Self, MockStreamSender) {
        let (tx, rx) = mpsc::unbounded_channel();
        (self.push(MockResponse::Channel(rx)), tx)
    }

    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    pub fn last_call(&self) -> Option<MockCall> {
        lock(&self.calls).last().cloned()
    }

    fn next_response(&self) -> MockResponse {
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Chunks(vec!["Mock response".to_string()]))
    }
}

fn scripted(chunks: Vec<String>) -> Vec<Result<StreamChunk, AIError>> {
    chunks.into_iter().map(|c| Ok(StreamChunk::content(c))).collect()
}

#[async_trait]
impl AIProvider for MockAIProvider {
    async fn stream_complete(
        &self,
        credential: &ApiCredential,
        request: CompletionRequest,
    ) -> Result<ChatStream, AIError> {
        lock(&self.calls).push(MockCall {
            api_key: credential.expose().to_string(),
            request,
        });

        match self.next_response() {
            MockResponse::Chunks(chunks) => {
                let mut items = scripted(chunks);
                items.push(Ok(StreamChunk::final_chunk(
                    FinishReason::Stop,
                    Some(TokenUsage::new(10, 20)),
                )));
                Ok(Box::pin(stream::iter(items)))
            }
            MockResponse::Error(err) => Err(err.into()),
            MockResponse::FirstItemError(err) => {
                Ok(Box::pin(stream::iter(vec![Err(err.into())])))
            }
            MockResponse::FailAfter(chunks, err) => {
                let mut items = scripted(chunks);
                items.push(Err(err.into()));
                Ok(Box::pin(stream::iter(items)))
            }
            MockResponse::Channel(rx) => Ok(Box::pin(stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|item| (item, rx))
            }))),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{MessageRole, RequestMetadata};

    fn test_request() -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new("trace-123", "single"))
            .with_message(MessageRole::User, "Hello")
    }

    fn key(k: &str) -> ApiCredential {
        ApiCredential::new(k)
    }

    async fn collect_text(stream: ChatStream) -> String {
        stream
            .map(|item| item.unwrap().delta)
            .collect::<Vec<_>>()
            .await
            .concat()
    }

    #[tokio::test]
    async fn streams_configured_chunks_in_order() {
        let provider = MockAIProvider::new().with_chunks(["Hel", "lo"]);

        let stream = provider.stream_complete(&key("k0"), test_request()).await.unwrap();
        let items: Vec<_> = stream.collect().await;

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap().delta, "Hel");
        assert_eq!(items[1].as_ref().unwrap().delta, "lo");
        assert!(items[2].as_ref().unwrap().is_final());
    }

    #[tokio::test]
    async fn returns_responses_in_order_then_default() {
        let provider = MockAIProvider::new()
            .with_response("First")
            .with_response("Second");

        let r1 = collect_text(provider.stream_complete(&key("k"), test_request()).await.unwrap()).await;
        let r2 = collect_text(provider.stream_complete(&key("k"), test_request()).await.unwrap()).await;
        let r3 = collect_text(provider.stream_complete(&key("k"), test_request()).await.unwrap()).await;

        assert_eq!(r1, "First");
        assert_eq!(r2, "Second");
        assert_eq!(r3, "Mock response");
    }

    #[tokio::test]
    async fn injected_error_fails_the_call() {
        let provider = MockAIProvider::new().with_error(MockError::RateLimited {
            message: "quota".to_string(),
        });

        let result = provider.stream_complete(&key("k"), test_request()).await;
        assert!(matches!(result, Err(AIError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn first_item_error_arrives_on_the_stream() {
        let provider = MockAIProvider::new().with_first_item_error(MockError::AuthenticationFailed);

        let mut stream = provider.stream_complete(&key("k"), test_request()).await.unwrap();
        assert!(matches!(stream.next().await, Some(Err(AIError::AuthenticationFailed))));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn error_after_chunks() {
        let provider = MockAIProvider::new().with_error_after(
            ["partial"],
            MockError::Network {
                message: "reset".to_string(),
            },
        );

        let items: Vec<_> = provider
            .stream_complete(&key("k"), test_request())
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(items[0].as_ref().unwrap().delta, "partial");
        assert!(matches!(items[1], Err(AIError::Network(_))));
    }

    #[tokio::test]
    async fn channel_stream_follows_sender() {
        let (provider, tx) = MockAIProvider::new().with_channel();
        let mut stream = provider.stream_complete(&key("k"), test_request()).await.unwrap();

        tx.send(Ok(StreamChunk::content("Hel"))).unwrap();
        assert_eq!(stream.next().await.unwrap().unwrap().delta, "Hel");

        tx.send(Ok(StreamChunk::content("lo"))).unwrap();
        drop(tx);
        assert_eq!(stream.next().await.unwrap().unwrap().delta, "lo");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn records_key_and_request() {
        let provider = MockAIProvider::new();
        provider.stream_complete(&key("k1"), test_request()).await.unwrap();

        assert_eq!(provider.call_count(), 1);
        let call = provider.last_call().unwrap();
        assert_eq!(call.api_key, "k1");
        assert_eq!(call.request.messages[0].content, "Hello");
    }
}
