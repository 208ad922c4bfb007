use crate::analysis::AnalysisTask;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskInfo {
    pub index: usize,
    pub id: String,
    pub label: String,
    pub instruction: String,
}

impl From<AnalysisTask> for TaskInfo {
    fn from(task: AnalysisTask) -> Self {
        Self {
            index: task.ordinal(),
            id: task.id().to_string(),
            label: task.label().to_string(),
            instruction: task.instruction().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PreferenceBody {
    pub stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub content: String,
    pub model: String,
}

/// Payload of a `delta` event on the streaming generate endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeltaEvent {
    pub content: String,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DoneEvent {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
