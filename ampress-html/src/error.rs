use std::io;

use thiserror::Error;

/// Error type for page transformation.
#[derive(Debug, Error)]
pub enum RenderError {
  #[error("Malformed body markup: {0}")]
  Parse(String),

  #[error("Serialization error: {0}")]
  Serialize(String),

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),
}

impl From<std::string::FromUtf8Error> for RenderError {
  fn from(e: std::string::FromUtf8Error) -> Self {
    Self::Serialize(e.to_string())
  }
}
