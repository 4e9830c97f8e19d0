//! Text embedding providers
//!
//! A provider turns text into fixed-length vectors. The same input always
//! produces the same vector for a given provider. Providers are built once
//! at startup and handed to the ranker; nothing here is global.

pub mod hashed;
#[cfg(feature = "neural")]
pub mod onnx;

use tracing::info;

use crate::config::{Backend, Config};
use crate::error::{CourseFinderError, Result};

pub use hashed::HashEmbedder;
#[cfg(feature = "neural")]
pub use onnx::OnnxEmbedder;

pub type Embedding = Vec<f32>;

/// Trait for computing text embeddings - allows for testing with mocks
#[cfg_attr(test, mockall::automock)]
pub trait EmbeddingProvider {
  /// Embed a batch of texts, one vector per input in input order
  fn encode_batch(&mut self, texts: &[String]) -> Result<Vec<Embedding>>;

  /// Short label for diagnostics
  fn name(&self) -> &'static str {
    std::any::type_name::<Self>()
  }

  /// Embed a single text
  fn encode(&mut self, text: &str) -> Result<Embedding> {
    let mut embeddings = self.encode_batch(&[text.to_string()])?;
    if embeddings.len() != 1 {
      return Err(CourseFinderError::embedding(format!(
        "expected 1 embedding for a single text, got {}",
        embeddings.len()
      )));
    }
    Ok(embeddings.remove(0))
  }
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for &mut P {
  fn encode_batch(&mut self, texts: &[String]) -> Result<Vec<Embedding>> {
    (**self).encode_batch(texts)
  }

  fn encode(&mut self, text: &str) -> Result<Embedding> {
    (**self).encode(text)
  }

  fn name(&self) -> &'static str {
    (**self).name()
  }
}

impl<P: EmbeddingProvider + ?Sized> EmbeddingProvider for Box<P> {
  fn encode_batch(&mut self, texts: &[String]) -> Result<Vec<Embedding>> {
    (**self).encode_batch(texts)
  }

  fn encode(&mut self, text: &str) -> Result<Embedding> {
    (**self).encode(text)
  }

  fn name(&self) -> &'static str {
    (**self).name()
  }
}

/// Build the provider selected in the configuration
pub async fn build_provider(config: &Config) -> Result<Box<dyn EmbeddingProvider>> {
  match config.backend {
    Backend::Hash => {
      info!(dimension = config.hash_dimension, "using hash embeddings");
      Ok(Box::new(HashEmbedder::new(config.hash_dimension)?))
    }
    #[cfg(feature = "neural")]
    Backend::Onnx => Ok(Box::new(OnnxEmbedder::load(&config.model).await?)),
    #[cfg(not(feature = "neural"))]
    Backend::Onnx => Err(CourseFinderError::model_load(
      "this build has no ONNX support; rebuild with the 'neural' feature or use --backend hash",
    )),
  }
}
