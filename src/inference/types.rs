use crate::{Error, Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of the chat-completion POST sent to the inference endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub stream: bool,
}

impl InferenceRequest {
    pub fn mode(&self) -> ResponseMode {
        ResponseMode::from_stream(self.stream)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Streaming,
    Complete,
}

impl ResponseMode {
    pub fn from_stream(stream: bool) -> Self {
        if stream { Self::Streaming } else { Self::Complete }
    }

    /// Value of the `Accept` header for this mode.
    pub fn accept(self) -> &'static str {
        match self {
            Self::Streaming => "text/event-stream",
            Self::Complete => "application/json",
        }
    }
}

/// Parses `body` as `T`, accepting only a top-level JSON object. Derived
/// struct impls would otherwise also read a JSON array positionally.
pub fn parse_object<T: DeserializeOwned>(body: &[u8]) -> serde_json::Result<T> {
    match serde_json::from_slice::<Value>(body)? {
        value @ Value::Object(_) => serde_json::from_value(value),
        _ => Err(serde::de::Error::custom("expected a JSON object")),
    }
}

// Every field below is optional so that a body missing part of the
// expected structure still parses; absence is handled by the accessors.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Option<Vec<CompletionChoice>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub message: Option<CompletionMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletion {
    /// Content of the first choice, or `""` when any part of the path is missing.
    pub fn first_content(&self) -> &str {
        self.choices
            .as_deref()
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .unwrap_or_default()
    }
}

/// A non-streaming response body, either parsed or rejected by the JSON parser.
#[derive(Debug)]
pub enum CompletionBody {
    Parsed(ChatCompletion),
    Malformed(serde_json::Error),
}

impl CompletionBody {
    pub fn parse(body: &[u8]) -> Self {
        match parse_object::<ChatCompletion>(body) {
            Ok(completion) => Self::Parsed(completion),
            Err(e) => Self::Malformed(e),
        }
    }

    pub fn into_content(self) -> Result<String> {
        match self {
            Self::Parsed(completion) => Ok(completion.first_content().to_string()),
            Self::Malformed(e) => Err(Error::response_with("invalid completion body", e)),
        }
    }
}

/// One `data:` frame of an event-stream response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub choices: Option<Vec<ChunkChoice>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: Option<ChunkDelta>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl StreamChunk {
    pub fn first_delta(&self) -> &str {
        self.choices
            .as_deref()
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.delta.as_ref())
            .and_then(|delta| delta.content.as_deref())
            .unwrap_or_default()
    }
}
