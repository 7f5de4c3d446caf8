use std::fmt;

#[derive(Debug)]
pub enum ReplicateError {
    ConfigError(String),
    RequestError(String),
    ResponseError(String),
    SerializationError(String),
    HttpError(String),
    PredictionError(String),
    StorageError(String),
}

impl fmt::Display for ReplicateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplicateError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ReplicateError::RequestError(msg) => write!(f, "Request error: {}", msg),
            ReplicateError::ResponseError(msg) => write!(f, "Response error: {}", msg),
            ReplicateError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            ReplicateError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ReplicateError::PredictionError(msg) => write!(f, "Prediction error: {}", msg),
            ReplicateError::StorageError(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for ReplicateError {}

pub type Result<T> = std::result::Result<T, ReplicateError>;
