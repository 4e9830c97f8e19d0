use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CourseFinderError>;

#[derive(Error, Debug)]
pub enum CourseFinderError {
  #[error("Failed to load embedding model: {message}")]
  ModelLoad { message: String },

  #[error("Failed to load course data from {}: {message}", path.display())]
  CorpusLoad { path: PathBuf, message: String },

  #[error("Failed to compute embeddings: {message}")]
  Embedding { message: String },

  #[error("Invalid argument: {message}")]
  InvalidArgument { message: String },

  #[error("Invalid configuration in {}: {message}", path.display())]
  Config { path: PathBuf, message: String },

  #[error("Terminal I/O failed: {0}")]
  Io(#[from] std::io::Error),
}

impl CourseFinderError {
  pub fn model_load(message: impl Into<String>) -> Self {
    Self::ModelLoad { message: message.into() }
  }

  pub fn corpus_load(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
    Self::CorpusLoad { path: path.as_ref().to_path_buf(), message: message.into() }
  }

  pub fn embedding(message: impl Into<String>) -> Self {
    Self::Embedding { message: message.into() }
  }

  pub fn invalid_argument(message: impl Into<String>) -> Self {
    Self::InvalidArgument { message: message.into() }
  }

  pub fn config(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
    Self::Config { path: path.as_ref().to_path_buf(), message: message.into() }
  }

  /// Errors scoped to a single query; the session can keep going after these.
  pub fn is_query_scoped(&self) -> bool {
    matches!(self, Self::Embedding { .. } | Self::InvalidArgument { .. })
  }
}
