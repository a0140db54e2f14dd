use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SlopError>;

#[derive(Debug, Error)]
pub enum SlopError {
    #[error("No API key configured. Please add your Google AI API key in settings.")]
    NoCredential,

    #[error("unknown generation mode: {0}")]
    InvalidMode(String),

    #[error("unknown intensity level: {0}")]
    InvalidLevel(String),

    #[error("{stage} blocked by safety filter ({reason})")]
    ContentPolicy { stage: Stage, reason: String },

    #[error("{stage} error: {message}")]
    Upstream { stage: Stage, message: String },

    #[error("{stage} returned no {expected}")]
    EmptyResponse { stage: Stage, expected: &'static str },

    #[error("{stage} returned a malformed response: {detail}")]
    MalformedResponse { stage: Stage, detail: String },

    #[error("local file error: {0}")]
    LocalIo(#[from] std::io::Error),

    #[error("network request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("no slop with id {0}")]
    RecordNotFound(i64),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Remote operation a [`SlopError`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vision,
    Imagen,
    Caption,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Vision => "Gemini Vision",
            Stage::Imagen => "Imagen",
            Stage::Caption => "Gemini Caption",
        };
        f.write_str(name)
    }
}

/// Stable classification of [`SlopError`] for callers that branch on failure type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoCredential,
    InvalidMode,
    InvalidLevel,
    ContentPolicy,
    Upstream,
    EmptyResponse,
    MalformedResponse,
    LocalIo,
    Transport,
    Storage,
    NotFound,
    InvalidInput,
    Config,
}

impl SlopError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SlopError::NoCredential => ErrorKind::NoCredential,
            SlopError::InvalidMode(_) => ErrorKind::InvalidMode,
            SlopError::InvalidLevel(_) => ErrorKind::InvalidLevel,
            SlopError::ContentPolicy { .. } => ErrorKind::ContentPolicy,
            SlopError::Upstream { .. } => ErrorKind::Upstream,
            SlopError::EmptyResponse { .. } => ErrorKind::EmptyResponse,
            SlopError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            SlopError::LocalIo(_) => ErrorKind::LocalIo,
            SlopError::Transport(_) => ErrorKind::Transport,
            SlopError::SerdeJson(_) | SlopError::Database(_) => ErrorKind::Storage,
            SlopError::RecordNotFound(_) => ErrorKind::NotFound,
            SlopError::InvalidInput(_) => ErrorKind::InvalidInput,
            SlopError::Config(_) => ErrorKind::Config,
        }
    }

    pub fn upstream(stage: Stage, message: impl Into<String>) -> Self {
        Self::Upstream {
            stage,
            message: message.into(),
        }
    }

    pub fn content_policy(stage: Stage, reason: impl Into<String>) -> Self {
        Self::ContentPolicy {
            stage,
            reason: reason.into(),
        }
    }

    /// Message carried over from the remote service, if this error has one.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            SlopError::Upstream { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for SlopError {
    fn from(value: anyhow::Error) -> Self {
        Self::Config(format!("{value:#}"))
    }
}
