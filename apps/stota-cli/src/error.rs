//! # CLI Error Type
//!
//! Unified error type for every command.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  command handler ── Result<T, AppError>                                 │
//! │       │                                                                 │
//! │       ├── DbError (storage or domain rejection) ──┐                     │
//! │       ├── config / io / csv / json ───────────────┤                     │
//! │       │                                           ▼                     │
//! │       │                                   main: eprintln + exit code    │
//! │       ▼                                                                 │
//! │  Success → stdout                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use stota_core::CoreError;
use stota_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Config file present but unusable.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A command argument could not be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        AppError::Db(DbError::Domain(err))
    }
}

impl AppError {
    /// Process exit code.
    ///
    /// ```text
    /// 1  storage, I/O, config
    /// 2  rejected input (validation, not found, insufficient stock, ...)
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::InvalidArgument(_) => 2,
            AppError::Db(err) if err.as_domain().is_some() => 2,
            _ => 1,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::from(CoreError::EmptyOrder).exit_code(), 2);
        assert_eq!(AppError::InvalidArgument("x".into()).exit_code(), 2);
        assert_eq!(AppError::Db(DbError::PoolExhausted).exit_code(), 1);
        assert_eq!(AppError::InvalidConfig("x".into()).exit_code(), 1);
    }

    #[test]
    fn test_domain_message_is_passed_through() {
        let err = AppError::from(CoreError::OrderNotFound("ORD1".into()));
        assert_eq!(err.to_string(), CoreError::OrderNotFound("ORD1".into()).to_string());
    }
}
