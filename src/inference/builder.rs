use super::types::{ChatMessage, InferenceRequest};
use crate::{
    Error, Result,
    analysis::{AnalysisTask, ImagePayload, SessionPreference},
    config::InferenceConfig,
};

/// Assembles the outbound chat-completion request from the user's inputs.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    model: String,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

impl RequestBuilder {
    pub fn new(config: &InferenceConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Fails with a validation error naming every missing input. Nothing is
    /// sent anywhere from here.
    pub fn build(
        &self,
        image: Option<&ImagePayload>,
        task: Option<AnalysisTask>,
        preference: SessionPreference,
    ) -> Result<InferenceRequest> {
        let (image, task) = match (image, task) {
            (Some(image), Some(task)) => (image, task),
            (image, task) => {
                let mut missing = Vec::new();
                if image.is_none() {
                    missing.push("image");
                }
                if task.is_none() {
                    missing.push("task");
                }
                return Err(Error::validation(format!(
                    "Please upload an image and select a task (missing: {}).",
                    missing.join(", ")
                )));
            }
        };

        Ok(InferenceRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(prompt_content(task, image))],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            stream: preference.stream,
        })
    }
}

/// Instruction text followed by the image as an inline `<img>` tag.
pub fn prompt_content(task: AnalysisTask, image: &ImagePayload) -> String {
    format!("{} <img src=\"{}\" />", task.instruction(), image.data_url())
}
