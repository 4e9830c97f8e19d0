//! Hash embeddings
//!
//! FNV-1a feature hashing over content words. No model files, no network,
//! fully deterministic. Two texts only score above zero when they share
//! words, so this is a lexical fallback rather than a semantic model.

use crate::embedding::{Embedding, EmbeddingProvider};
use crate::error::{CourseFinderError, Result};
use crate::similarity;

pub const DEFAULT_DIMENSION: usize = 384;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Common English stop words to filter out
const STOP_WORDS: &[&str] = &[
  // Articles and determiners
  "the", "a", "an", // Conjunctions
  "and", "or", "but", // Prepositions
  "in", "on", "at", "to", "for", "of", "with", "by", "over", "from", "into", // Common verbs
  "is", "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will",
  "would", "could", "should", "can", // Pronouns
  "you", "your", "we", "our", "us", "they", "them", "their", "it", "its", "i", "my", "me",
];

/// Hash embedder using FNV-1a
#[derive(Debug, Clone)]
pub struct HashEmbedder {
  dimension: usize,
}

impl Default for HashEmbedder {
  fn default() -> Self {
    Self { dimension: DEFAULT_DIMENSION }
  }
}

impl HashEmbedder {
  pub fn new(dimension: usize) -> Result<Self> {
    if dimension == 0 {
      return Err(CourseFinderError::invalid_argument("hash embedding dimension must be at least 1"));
    }
    Ok(Self { dimension })
  }

  pub fn dimension(&self) -> usize {
    self.dimension
  }

  /// Embed text into a unit vector; text without content words maps to zeros
  pub fn embed(&self, text: &str) -> Embedding {
    let mut vector = vec![0.0f32; self.dimension];

    for word in content_words(text) {
      let hash = fnv1a(word.as_bytes());
      let bucket = (hash % self.dimension as u64) as usize;
      let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
      vector[bucket] += sign;
    }

    similarity::normalize(vector)
  }
}

impl EmbeddingProvider for HashEmbedder {
  fn name(&self) -> &'static str {
    "hash"
  }

  fn encode_batch(&mut self, texts: &[String]) -> Result<Vec<Embedding>> {
    Ok(texts.iter().map(|text| self.embed(text)).collect())
  }
}

/// Lowercased words with punctuation and stop words stripped, in text order
pub fn content_words(text: &str) -> Vec<String> {
  text
    .split_whitespace()
    .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
    .filter(|word| !word.is_empty() && !STOP_WORDS.contains(&word.as_str()))
    .collect()
}

fn fnv1a(bytes: &[u8]) -> u64 {
  bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME))
}
