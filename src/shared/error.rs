use thiserror::Error;
use serde::Serialize;

#[derive(Error, Debug, Serialize)]
pub enum AppError {
    #[error("I/O Error: {0}")]
    Io(String),

    #[error("Network Error: {0}")]
    Network(String),

    #[error("Storage Error: {0}")]
    Storage(String),

    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("Host Error: {0}")]
    Host(String),

    #[error("Unknown Error: {0}")]
    Unknown(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(format!("Serialization error: {}", err))
    }
}

impl From<redb::Error> for AppError {
    fn from(err: redb::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Unknown(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Unknown(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
