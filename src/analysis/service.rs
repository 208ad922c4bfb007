use super::{AnalysisTask, ImagePayload, SessionPreference};
use crate::{
    Result,
    config::InferenceConfig,
    inference::{Generation, HttpInferenceClient, InferenceClient, RequestBuilder, decode},
};
use std::sync::Arc;
use tracing::{debug, info};

/// Runs one "Generate" action: validate, build, send once, decode.
pub struct Analyzer {
    builder: RequestBuilder,
    client: Arc<dyn InferenceClient>,
}

impl Analyzer {
    pub fn new(builder: RequestBuilder, client: Arc<dyn InferenceClient>) -> Self {
        Self { builder, client }
    }

    pub fn from_config(config: &InferenceConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = HttpInferenceClient::new(config, api_key)?;
        Ok(Self::new(RequestBuilder::new(config), Arc::new(client)))
    }

    pub fn model(&self) -> &str {
        self.builder.model()
    }

    pub async fn generate(
        &self,
        image: Option<&ImagePayload>,
        task: Option<AnalysisTask>,
        preference: SessionPreference,
    ) -> Result<Generation> {
        let request = self.builder.build(image, task, preference)?;

        if let (Some(image), Some(task)) = (image, task) {
            info!(
                "Requesting {} analysis of a {} byte {} upload (stream: {})",
                task.id(),
                image.byte_len(),
                image.format().mime_type(),
                request.stream
            );
        }

        let pending = self.client.send(&request).await?;
        debug!("Inference endpoint accepted the request");

        decode(pending).await
    }
}
