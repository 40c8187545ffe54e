//! Error types for the pulga-wire normalizer.
//!
//! Mapping a parsed `serde_json::Value` never fails; only the text entry
//! points can, when the body is not JSON at all.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
