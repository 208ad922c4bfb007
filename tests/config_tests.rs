use pretty_assertions::assert_eq;
use vision_analyst::config;

mod common;
use common::{
    INVALID_CONFIG_YAML, PARTIAL_CONFIG_YAML, SAMPLE_CONFIG_YAML, create_test_config_file,
};

#[tokio::test]
async fn test_load_full_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = create_test_config_file(&dir, SAMPLE_CONFIG_YAML).await.unwrap();

    let config = config::load_from(&path).await.unwrap();

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.server.max_upload_bytes, 1_048_576);
    assert!(!config.server.stream_by_default);
    assert_eq!(config.server.logs.level, "debug");
    assert_eq!(config.inference.invoke_url, "http://localhost:3000/v1/chat/completions");
    assert_eq!(config.inference.model, "test/vision-model");
    assert_eq!(config.inference.api_key_env, "TEST_VISION_KEY");
    assert_eq!(config.inference.max_tokens, 256);
    assert_eq!(config.inference.temperature, 0.5);
    assert_eq!(config.inference.top_p, 0.9);
    assert_eq!(config.inference.timeout_secs, 5);
}

#[tokio::test]
async fn test_partial_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = create_test_config_file(&dir, PARTIAL_CONFIG_YAML).await.unwrap();

    let config = config::load_from(&path).await.unwrap();

    assert_eq!(config.inference.model, "test/other-model");
    assert_eq!(config.inference.max_tokens, 512);
    assert_eq!(config.inference.temperature, 1.0);
    assert_eq!(config.inference.top_p, 1.0);
    assert_eq!(config.inference.api_key_env, "NVIDIA_VISION_KEY");
    assert_eq!(config.server.port, 8080);
    assert!(config.server.stream_by_default);
}

#[tokio::test]
async fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");

    let config = config::load_from(&path.to_string_lossy()).await.unwrap();

    assert_eq!(config.inference.model, "meta/llama-3.2-90b-vision-instruct");
    assert_eq!(
        config.inference.invoke_url,
        "https://ai.api.nvidia.com/v1/gr/meta/llama-3.2-90b-vision-instruct/chat/completions"
    );
    assert_eq!(config.server.logs.level, "info");
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = create_test_config_file(&dir, INVALID_CONFIG_YAML).await.unwrap();

    let err = config::load_from(&path).await.unwrap_err();
    assert!(err.to_string().contains("YAML error"));
}
