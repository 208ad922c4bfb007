use super::MockInferenceClient;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::fs;
use vision_analyst::{
    Result,
    analysis::{Analyzer, ImagePayload},
    config::InferenceConfig,
    inference::RequestBuilder,
};

pub const MULTIPART_BOUNDARY: &str = "vision-analyst-test-boundary";

/// Smallest byte sequence that passes PNG sniffing
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
    bytes.extend_from_slice(&[0, 0, 0, 13, b'I', b'H', b'D', b'R', 0, 0, 0, 1]);
    bytes
}

pub fn jpeg_bytes() -> Vec<u8> {
    vec![0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00]
}

pub fn png_payload() -> ImagePayload {
    ImagePayload::new(png_bytes()).expect("test PNG should be accepted")
}

/// One event-stream frame carrying `content` as its delta
pub fn sse_frame(content: &str) -> String {
    format!(
        "data: {}\n\n",
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion.chunk",
            "choices": [{"index": 0, "delta": {"role": "assistant", "content": content}}]
        })
    )
}

/// A full event-stream body for the given fragments, ending with `[DONE]`
pub fn sse_body(fragments: &[&str]) -> String {
    let mut body: String = fragments.iter().map(|f| sse_frame(f)).collect();
    body.push_str("data: [DONE]\n\n");
    body
}

pub fn completion_body(content: &str) -> String {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

pub fn create_analyzer(mock: &MockInferenceClient) -> Analyzer {
    Analyzer::new(
        RequestBuilder::new(&InferenceConfig::default()),
        Arc::new(mock.clone()),
    )
}

/// Builds a multipart/form-data body using [`MULTIPART_BOUNDARY`]
#[derive(Debug, Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part(&format!("form-data; name=\"{}\"", name));
        self.body.extend_from_slice(b"\r\n");
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn file(mut self, name: &str, filename: &str, contents: &[u8]) -> Self {
        self.open_part(&format!(
            "form-data; name=\"{}\"; filename=\"{}\"",
            name, filename
        ));
        self.body
            .extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        self.body.extend_from_slice(contents);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", MULTIPART_BOUNDARY).as_bytes());
        self.body
    }

    fn open_part(&mut self, disposition: &str) {
        self.body
            .extend_from_slice(format!("--{}\r\n", MULTIPART_BOUNDARY).as_bytes());
        self.body
            .extend_from_slice(format!("Content-Disposition: {}\r\n", disposition).as_bytes());
    }
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", MULTIPART_BOUNDARY)
}

/// Create a test config YAML file
pub async fn create_test_config_file(dir: &TempDir, content: &str) -> Result<String> {
    let config_path = dir.path().join("config.yaml");
    fs::write(&config_path, content).await?;
    Ok(config_path.to_string_lossy().to_string())
}

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
server:
  host: "127.0.0.1"
  port: 9090
  max_upload_bytes: 1048576
  stream_by_default: false
  logs:
    level: "debug"

inference:
  invoke_url: "http://localhost:3000/v1/chat/completions"
  model: "test/vision-model"
  api_key_env: "TEST_VISION_KEY"
  max_tokens: 256
  temperature: 0.5
  top_p: 0.9
  timeout_secs: 5
"#;

/// Only overrides the model, everything else falls back to defaults
pub const PARTIAL_CONFIG_YAML: &str = r#"
inference:
  model: "test/other-model"
"#;

pub const INVALID_CONFIG_YAML: &str = r#"
server:
  port: "not-a-number"
"#;
