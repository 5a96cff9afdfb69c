use engine::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("login required")]
    Unauthorized,
    #[error("insufficient permissions")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("rejected by server: {0}")]
    Validation(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed reply: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid base url: {0}")]
    InvalidUrl(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl ClientError {
    /// Failures worth retrying on the next poll tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Server(_))
    }

    /// Maps an error reply onto a variant.
    pub(crate) fn from_reply(status: u16, message: String) -> Self {
        if message == "login required" {
            return Self::Unauthorized;
        }
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict(message),
            400 | 422 => Self::Validation(message),
            _ => Self::Server(message),
        }
    }
}
