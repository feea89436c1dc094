use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
  #[error("invalid target: {0}")]
  InvalidTarget(String),

  #[error("connection error: {0}")]
  Io(#[from] std::io::Error),

  #[error("query timed out after {0:?}")]
  Timeout(Duration),

  #[error("protocol error: {0}")]
  Protocol(String),

  #[error("fallback request failed: {0}")]
  FallbackTransport(#[from] reqwest::Error),

  #[error("fallback api returned {0}")]
  FallbackStatus(reqwest::StatusCode),

  #[error("fallback api returned malformed json: {0}")]
  FallbackDecode(#[from] serde_json::Error),
}

impl QueryError {
  /// Stable name of the failure class, used as a log field.
  pub fn kind(&self) -> &'static str {
    match self {
      QueryError::InvalidTarget(_) => "invalid_target",
      QueryError::Io(_) | QueryError::Timeout(_) => "transport",
      QueryError::Protocol(_) => "protocol",
      QueryError::FallbackTransport(_) | QueryError::FallbackStatus(_) => "fallback_http",
      QueryError::FallbackDecode(_) => "fallback_decode",
    }
  }
}

pub type Result<T> = std::result::Result<T, QueryError>;
