//! Gemini Provider - Implementation of AIProvider for Google's Generative Language API.
//!
//! Streams `streamGenerateContent` responses over Server-Sent Events and can
//! enable the `google_search` grounding tool.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new()
//!     .with_model("gemini-2.5-flash")
//!     .with_timeout(Some(Duration::from_secs(120)));
//!
//! let provider = GeminiProvider::new(config)?;
//! let stream = provider.stream_complete(&credential, request).await?;
//! ```
//!
//! # Streaming
//!
//! SSE events can be split across transport chunks, so bytes are buffered
//! until a full line is available before a `data:` payload is parsed.

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt::Display;
use std::time::Duration;

use crate::domain::credentials::ApiCredential;
use crate::ports::{
    AIError, AIProvider, ChatStream, CompletionRequest, FinishReason, MessageRole, ProviderInfo,
    StreamChunk, TokenUsage,
};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Model to use (e.g., "gemini-2.5-flash").
    pub model: String,
    /// Base URL for the API, without a trailing slash.
    pub base_url: String,
    /// Whole-request timeout; `None` lets long generations run to completion.
    pub timeout: Option<Duration>,
}

impl GeminiConfig {
    pub fn new() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Gemini API provider implementation.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new provider.
    ///
    /// # Errors
    ///
    /// `AIError::InvalidRequest` if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, AIError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AIError::InvalidRequest(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.config.base_url, self.config.model
        )
    }

    /// Converts our request to Gemini's format.
    fn to_gemini_request(request: &CompletionRequest) -> GeminiRequest {
        let contents = request
            .messages
            .iter()
            .map(|msg| GeminiContent {
                role: Some(
                    match msg.role {
                        MessageRole::User => "user",
                        MessageRole::Assistant => "model",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart {
                    text: msg.content.clone(),
                }],
            })
            .collect();

        let system_instruction = request.system_prompt.as_ref().map(|prompt| GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: prompt.clone(),
            }],
        });

        let tools = if request.enable_search {
            vec![GeminiTool {
                google_search: EmptyObject {},
            }]
        } else {
            Vec::new()
        };

        GeminiRequest {
            system_instruction,
            contents,
            tools,
        }
    }

    async fn send_streaming_request(
        &self,
        credential: &ApiCredential,
        request: &CompletionRequest,
    ) -> Result<Response, AIError> {
        let body = Self::to_gemini_request(request);

        self.client
            .post(self.stream_url())
            .header("x-goog-api-key", credential.expose())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AIError::Timeout {
                        timeout_secs: self.config.timeout.map(|t| t.as_secs()).unwrap_or_default(),
                    }
                } else if e.is_connect() {
                    AIError::network(format!("Connection failed: {}", e))
                } else {
                    AIError::network(e.to_string())
                }
            })
    }

    async fn handle_response_status(response: Response) -> Result<Response, AIError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        Err(status_error(status.as_u16(), &error_body))
    }
}

/// Maps a non-success HTTP status and its body to an `AIError`.
fn status_error(status: u16, body: &str) -> AIError {
    let detail = serde_json::from_str::<GeminiErrorEnvelope>(body)
        .map(|envelope| envelope.error.describe())
        .unwrap_or_else(|_| body.to_string());

    match status {
        429 => AIError::rate_limited(detail),
        401 | 403 => AIError::AuthenticationFailed,
        400 if detail.contains("API_KEY_INVALID") || detail.contains("API key not valid") => {
            AIError::AuthenticationFailed
        }
        400 => AIError::InvalidRequest(detail),
        500..=599 => AIError::unavailable(format!("Server error {}: {}", status, detail)),
        _ => AIError::network(format!("Unexpected status {}: {}", status, detail)),
    }
}

#[async_trait]
impl AIProvider for GeminiProvider {
    async fn stream_complete(
        &self,
        credential: &ApiCredential,
        request: CompletionRequest,
    ) -> Result<ChatStream, AIError> {
        tracing::debug!(
            trace_id = %request.metadata.trace_id,
            model = %self.config.model,
            messages = request.messages.len(),
            search = request.enable_search,
            "Starting Gemini stream"
        );

        let response = self.send_streaming_request(credential, &request).await?;
        let response = Self::handle_response_status(response).await?;

        Ok(sse_chunk_stream(Box::pin(response.bytes_stream())))
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("gemini", &self.config.model).with_search(true)
    }
}

/// Buffers raw bytes and yields complete SSE `data:` payloads.
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Appends `bytes` and returns every payload whose line is now complete.
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(data) = data_payload(&line) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Payload of a trailing line that never got its newline.
    fn finish(&mut self) -> Option<String> {
        let line = std::mem::take(&mut self.buffer);
        data_payload(&line)
    }
}

fn data_payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches(['\r', '\n']);
    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() {
        None
    } else {
        Some(data.to_string())
    }
}

struct SseState<S> {
    inner: S,
    decoder: SseDecoder,
    pending: VecDeque<Result<StreamChunk, AIError>>,
    finished: bool,
}

/// Turns an SSE byte stream into output chunks.
///
/// A transport error ends the stream after being yielded once.
fn sse_chunk_stream<S, B, E>(inner: S) -> ChatStream
where
    S: Stream<Item = Result<B, E>> + Unpin + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = SseState {
        inner,
        decoder: SseDecoder::default(),
        pending: VecDeque::new(),
        finished: false,
    };

    let stream = stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.inner.next().await {
                Some(Ok(bytes)) => {
                    for data in state.decoder.push(bytes.as_ref()) {
                        state.pending.extend(parse_event(&data));
                    }
                }
                Some(Err(e)) => {
                    state
                        .pending
                        .push_back(Err(AIError::network(format!("Stream error: {}", e))));
                    state.finished = true;
                }
                None => {
                    if let Some(data) = state.decoder.finish() {
                        state.pending.extend(parse_event(&data));
                    }
                    state.finished = true;
                }
            }
        }
    });

    Box::pin(stream)
}

/// Parses one SSE payload into zero or more chunks.
fn parse_event(data: &str) -> Vec<Result<StreamChunk, AIError>> {
    let event = match serde_json::from_str::<GeminiStreamEvent>(data) {
        Ok(event) => event,
        Err(e) => {
            return vec![Err(AIError::parse(format!(
                "Failed to parse SSE chunk: {}",
                e
            )))]
        }
    };

    if let Some(error) = event.error {
        let detail = error.describe();
        return vec![Err(if error.is_quota() {
            AIError::rate_limited(detail)
        } else {
            AIError::unavailable(detail)
        })];
    }

    if let Some(reason) = event.prompt_feedback.and_then(|f| f.block_reason) {
        return vec![Err(AIError::content_filtered(reason))];
    }

    let mut results = Vec::new();
    let Some(candidate) = event.candidates.into_iter().next() else {
        return results;
    };

    let text: String = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter(|p| !p.thought)
                .filter_map(|p| p.text)
                .collect()
        })
        .unwrap_or_default();
    if !text.is_empty() {
        results.push(Ok(StreamChunk::content(text)));
    }

    if let Some(reason) = candidate.finish_reason {
        let finish = match reason.as_str() {
            "STOP" => FinishReason::Stop,
            "MAX_TOKENS" => FinishReason::Length,
            "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" => {
                FinishReason::ContentFilter
            }
            _ => FinishReason::Other,
        };
        let usage = event.usage_metadata.map(|u| {
            TokenUsage::new(u.prompt_token_count, u.candidates_token_count)
        });
        results.push(Ok(StreamChunk::final_chunk(finish, usage)));
    }

    results
}

// ----- Gemini API Types -----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiTool {
    google_search: EmptyObject,
}

#[derive(Debug, Serialize)]
struct EmptyObject {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiStreamEvent {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    error: Option<GeminiErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GeminiErrorBody {
    fn is_quota(&self) -> bool {
        self.code == 429 || self.status == "RESOURCE_EXHAUSTED"
    }

    fn describe(&self) -> String {
        format!("[{} {}] {}", self.code, self.status, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{Message, RequestMetadata};

    fn request() -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new("trace-1", "single"))
            .with_system_prompt("You are Riya")
            .with_messages(vec![Message::user("hi"), Message::assistant("hello!")])
            .with_message(MessageRole::User, "GST rate on gold?")
    }

    #[test]
    fn config_builder_works() {
        let config = GeminiConfig::new()
            .with_model("gemini-2.0-flash")
            .with_base_url("http://localhost:9999/v1beta/")
            .with_timeout(Some(Duration::from_secs(30)));

        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.base_url, "http://localhost:9999/v1beta");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn stream_url_targets_sse_endpoint() {
        let provider = GeminiProvider::new(GeminiConfig::new()).unwrap();
        assert_eq!(
            provider.stream_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:streamGenerateContent?alt=sse"
        );
    }

    #[test]
    fn request_body_has_system_instruction_history_and_search_tool() {
        let body = serde_json::to_value(GeminiProvider::to_gemini_request(&request().with_search(true))).unwrap();

        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You are Riya");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"].as_array().unwrap().len(), 3);
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"][2]["parts"][0]["text"], "GST rate on gold?");
        assert!(body["tools"][0]["google_search"].is_object());
    }

    #[test]
    fn search_tool_omitted_when_disabled() {
        let body = serde_json::to_value(GeminiProvider::to_gemini_request(&request())).unwrap();
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn provider_info_reports_model() {
        let provider = GeminiProvider::new(GeminiConfig::new()).unwrap();
        let info = provider.provider_info();
        assert_eq!(info.name, "gemini");
        assert_eq!(info.model, "gemini-2.5-flash");
        assert!(info.supports_search);
    }

    #[test]
    fn status_429_is_rate_limited() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = status_error(429, body);
        assert!(matches!(err, AIError::RateLimited { .. }));
        assert!(err.is_quota_exhausted());
    }

    #[test]
    fn invalid_key_is_authentication_failure() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        assert!(matches!(status_error(400, body), AIError::AuthenticationFailed));
    }

    #[test]
    fn server_errors_are_unavailable() {
        let err = status_error(503, "overloaded");
        assert!(matches!(err, AIError::Unavailable { .. }));
        assert!(!err.is_quota_exhausted());
    }

    #[test]
    fn parse_content_event() {
        let data = r#"{"candidates":[{"content":{"parts":[{"text":"Hel"},{"text":"lo"}],"role":"model"}}]}"#;
        let chunks = parse_event(data);

        assert_eq!(chunks.len(), 1);
        let chunk = chunks[0].as_ref().unwrap();
        assert_eq!(chunk.delta, "Hello");
        assert!(!chunk.is_final());
    }

    #[test]
    fn parse_final_event_with_usage() {
        let data = r#"{"candidates":[{"content":{"parts":[{"text":"!"}]},"finishReason":"STOP"}],"usageMetadata":{"promptTokenCount":10,"candidatesTokenCount":5,"totalTokenCount":15}}"#;
        let chunks = parse_event(data);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].as_ref().unwrap().delta, "!");
        let last = chunks[1].as_ref().unwrap();
        assert_eq!(last.finish_reason, Some(FinishReason::Stop));
        assert_eq!(last.usage.as_ref().unwrap().total_tokens, 15);
    }

    #[test]
    fn parse_error_event_detects_quota() {
        let data = r#"{"error":{"code":429,"message":"quota","status":"RESOURCE_EXHAUSTED"}}"#;
        let chunks = parse_event(data);
        assert!(matches!(chunks[0], Err(AIError::RateLimited { .. })));
    }

    #[test]
    fn parse_blocked_prompt() {
        let data = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert!(matches!(parse_event(data)[0], Err(AIError::ContentFiltered { .. })));
    }

    #[test]
    fn parse_garbage_is_parse_error() {
        assert!(matches!(parse_event("{not json")[0], Err(AIError::Parse(_))));
    }

    #[test]
    fn decoder_joins_lines_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: {\"a\":").is_empty());
        assert_eq!(decoder.push(b"1}\r\n\r\ndata: x\n"), vec!["{\"a\":1}", "x"]);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn decoder_flushes_unterminated_tail() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b": keep-alive\ndata: tail").is_empty());
        assert_eq!(decoder.finish(), Some("tail".to_string()));
    }

    #[tokio::test]
    async fn byte_stream_yields_chunks_in_order() {
        let event_a = br#"data: {"candidates":[{"content":{"parts":[{"text":"Hel"}]}}]}"#;
        let event_b = br#"data: {"candidates":[{"content":{"parts":[{"text":"lo"}]},"finishReason":"STOP"}]}"#;

        let mut raw = Vec::new();
        raw.extend_from_slice(event_a);
        raw.extend_from_slice(b"\n\n");
        raw.extend_from_slice(event_b);
        raw.extend_from_slice(b"\n\n");
        let (first, second) = raw.split_at(20);

        let parts: Vec<Result<Vec<u8>, String>> = vec![Ok(first.to_vec()), Ok(second.to_vec())];
        let chunks: Vec<_> = sse_chunk_stream(stream::iter(parts)).collect().await;

        let deltas: Vec<String> = chunks
            .iter()
            .map(|c| c.as_ref().unwrap().delta.clone())
            .collect();
        assert_eq!(deltas, vec!["Hel", "lo", ""]);
        assert!(chunks[2].as_ref().unwrap().is_final());
    }

    #[tokio::test]
    async fn transport_error_ends_stream() {
        let parts: Vec<Result<Vec<u8>, String>> = vec![
            Ok(br#"data: {"candidates":[{"content":{"parts":[{"text":"Hi"}]}}]}"#.to_vec()),
            Ok(b"\n".to_vec()),
            Err("connection reset".to_string()),
            Ok(b"data: ignored\n".to_vec()),
        ];
        let chunks: Vec<_> = sse_chunk_stream(stream::iter(parts)).collect().await;

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].as_ref().unwrap().delta, "Hi");
        assert!(matches!(chunks[1], Err(AIError::Network(_))));
    }
}
