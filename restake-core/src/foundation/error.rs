use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ReadFailure,
    WriteFailure,
    Reverted,
    FinalityTimeout,
    MalformedInput,
    ConfigError,
    SerializationError,
    Message,
}

#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum RestakeError {
    /// Chain query failed (eth_call, balance, receipt lookup).
    #[error("chain read failed during {operation}: {details}")]
    ReadFailure { operation: String, details: String },

    /// Submission was rejected by the node or the signer.
    #[error("chain write failed during {operation}: {details}")]
    WriteFailure { operation: String, details: String },

    #[error("transaction reverted tx={tx_hash} ({operation})")]
    Reverted { operation: String, tx_hash: String },

    #[error("transaction not finalized within {timeout_secs}s tx={tx_hash}")]
    FinalityTimeout { tx_hash: String, timeout_secs: u64 },

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("{format} serialization error: {details}")]
    SerializationError { format: String, details: String },

    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, RestakeError>;

impl RestakeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RestakeError::ReadFailure { .. } => ErrorCode::ReadFailure,
            RestakeError::WriteFailure { .. } => ErrorCode::WriteFailure,
            RestakeError::Reverted { .. } => ErrorCode::Reverted,
            RestakeError::FinalityTimeout { .. } => ErrorCode::FinalityTimeout,
            RestakeError::MalformedInput(_) => ErrorCode::MalformedInput,
            RestakeError::ConfigError(_) => ErrorCode::ConfigError,
            RestakeError::SerializationError { .. } => ErrorCode::SerializationError,
            RestakeError::Message(_) => ErrorCode::Message,
        }
    }

    pub fn context(&self) -> ErrorContext {
        ErrorContext { code: self.code(), message: self.to_string() }
    }

    pub fn read_failure(operation: impl Into<String>, details: impl ToString) -> Self {
        RestakeError::ReadFailure { operation: operation.into(), details: details.to_string() }
    }

    pub fn write_failure(operation: impl Into<String>, details: impl ToString) -> Self {
        RestakeError::WriteFailure { operation: operation.into(), details: details.to_string() }
    }

    pub fn malformed(details: impl Into<String>) -> Self {
        RestakeError::MalformedInput(details.into())
    }
}

impl From<figment::Error> for RestakeError {
    fn from(err: figment::Error) -> Self {
        RestakeError::ConfigError(format!("config extraction failed: {}", err))
    }
}

impl From<io::Error> for RestakeError {
    fn from(err: io::Error) -> Self {
        RestakeError::Message(format!("io error: {}", err))
    }
}

impl From<serde_json::Error> for RestakeError {
    fn from(err: serde_json::Error) -> Self {
        RestakeError::SerializationError { format: "json".to_string(), details: err.to_string() }
    }
}

// NOTE: Avoid adding generic "stringly" error conversions here.
// Use structured `RestakeError` variants at the call site to preserve context.
