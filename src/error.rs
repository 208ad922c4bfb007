use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Response error: {message}")]
    Response {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn response(msg: impl Into<String>) -> Self {
        Self::Response {
            message: msg.into(),
            source: None,
        }
    }

    /// Response error that keeps the underlying cause attached.
    pub fn response_with(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Response {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_response(&self) -> bool {
        matches!(self, Self::Response { .. })
    }

    /// Message shown to the user, including the underlying cause if any.
    pub fn user_message(&self) -> String {
        match self {
            Self::Response {
                message,
                source: Some(source),
            } => format!("An error occurred: {}: {}", message, source),
            Self::Validation(msg) => msg.clone(),
            other => format!("An error occurred: {}", other),
        }
    }
}
