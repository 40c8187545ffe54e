//! Error types for `pulga-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid RUT format: {0:?}")]
  InvalidRut(String),

  #[error("session store error: {0}")]
  SessionStore(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
