//! Error taxonomy shared by the core services / 核心服务错误类型

use thiserror::Error;

/// Authentication and authorization failures / 认证与授权错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No bearer token on a protected request
    #[error("Not authenticated")]
    MissingToken,

    /// Bad signature, malformed or expired token
    #[error("Invalid token")]
    InvalidToken,

    /// Token is genuine but does not grant admin access
    #[error("Not authorized")]
    Forbidden,
}

/// Input validation failures / 输入校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Query is required")]
    EmptyQuery,

    #[error("No files uploaded")]
    NoFiles,

    #[error("No valid files")]
    NoValidFiles,

    #[error("Invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Failures raised by the card store collaborator / 存储层错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored card {id} is corrupt: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("Store returned {actual} ids for {expected} cards")]
    IdCountMismatch { expected: usize, actual: usize },
}

/// Errors surfaced by SearchEngine and IngestionService / 业务服务错误
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Start-up configuration errors, all fatal / 启动配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to write config file: {0}")]
    Write(std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("SECRET_KEY is not set")]
    MissingSecret,

    #[error("Access token lifetime of {0} minutes is out of range")]
    InvalidTokenLifetime(u64),
}
