use super::types::{InferenceRequest, ResponseMode};
use crate::{Error, Result, config::InferenceConfig};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use std::{pin::Pin, time::Duration};
use tracing::{debug, warn};

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

const ERROR_BODY_LIMIT: usize = 500;

/// A response whose headers have arrived but whose body has not been read.
pub struct PendingResponse {
    mode: ResponseMode,
    body: ByteStream,
}

impl std::fmt::Debug for PendingResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingResponse")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl PendingResponse {
    pub fn new(mode: ResponseMode, body: ByteStream) -> Self {
        Self { mode, body }
    }

    /// Wraps an already-buffered body, split into the given chunks.
    pub fn from_chunks<I, B>(mode: ResponseMode, chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        let chunks: Vec<Result<Bytes>> = chunks.into_iter().map(|c| Ok(c.into())).collect();
        Self::new(mode, futures::stream::iter(chunks).boxed())
    }

    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    pub fn into_body(self) -> ByteStream {
        self.body
    }
}

#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Issues exactly one request. Never retries.
    async fn send(&self, request: &InferenceRequest) -> Result<PendingResponse>;
}

/// `timeout` bounds connecting and every individual read. A complete reply
/// must also arrive within it as a whole; a streamed reply may run longer as
/// long as it never stalls for that long.
pub struct HttpInferenceClient {
    client: reqwest::Client,
    invoke_url: String,
    api_key: String,
    timeout: Duration,
}

impl HttpInferenceClient {
    pub fn new(config: &InferenceConfig, api_key: impl Into<String>) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            invoke_url: config.invoke_url.clone(),
            api_key: api_key.into(),
            timeout,
        })
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn send(&self, request: &InferenceRequest) -> Result<PendingResponse> {
        let mode = request.mode();
        debug!(
            "Posting inference request to {} (model: {}, mode: {:?})",
            self.invoke_url, request.model, mode
        );

        let mut builder = self
            .client
            .post(&self.invoke_url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(ACCEPT, mode.accept())
            .json(request);
        if mode == ResponseMode::Complete {
            builder = builder.timeout(self.timeout);
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            warn!("Inference endpoint returned {}: {}", status, body);
            return Err(Error::response(format!(
                "inference endpoint returned {}: {}",
                status, body
            )));
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(Error::from))
            .boxed();

        Ok(PendingResponse::new(mode, body))
    }
}
