use client::ClientError;
use engine::PermissionLevel;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("{0}")]
    Usage(String),
    #[error("{level} access cannot {action}")]
    Denied {
        action: &'static str,
        level: PermissionLevel,
    },
}
