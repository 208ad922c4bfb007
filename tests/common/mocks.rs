use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use vision_analyst::{
    Error, Result,
    inference::{InferenceClient, InferenceRequest, PendingResponse},
};

/// Mock inference client that records every request it is asked to send
#[derive(Debug, Clone)]
pub struct MockInferenceClient {
    pub requests: Arc<Mutex<Vec<InferenceRequest>>>,
    pub chunks: Vec<String>,
    pub error: Option<String>,
}

impl MockInferenceClient {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            chunks: Vec::new(),
            error: None,
        }
    }

    /// Body returned for every request, delivered in the given chunks
    pub fn with_body_chunks(mut self, chunks: Vec<String>) -> Self {
        self.chunks = chunks;
        self
    }

    pub fn with_body(self, body: &str) -> Self {
        self.with_body_chunks(vec![body.to_string()])
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn get_requests(&self) -> Vec<InferenceRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl InferenceClient for MockInferenceClient {
    async fn send(&self, request: &InferenceRequest) -> Result<PendingResponse> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(ref error) = self.error {
            return Err(Error::response(error.clone()));
        }

        Ok(PendingResponse::from_chunks(
            request.mode(),
            self.chunks.clone(),
        ))
    }
}

impl Default for MockInferenceClient {
    fn default() -> Self {
        Self::new()
    }
}
