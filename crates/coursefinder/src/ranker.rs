//! Similarity ranking
//!
//! Corpus titles are embedded once when the ranker is built. Each query then
//! costs a single embedding call plus one cosine similarity per title.

use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

use crate::embedding::{Embedding, EmbeddingProvider};
use crate::error::{CourseFinderError, Result};
use crate::similarity::cosine_similarity;

/// A ranked corpus position
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Match {
  pub index: usize,
  pub score: f32,
}

pub struct Ranker<P> {
  provider: P,
  corpus_embeddings: Vec<Embedding>,
}

impl<P: EmbeddingProvider> Ranker<P> {
  /// Embed every title up front; the table is never recomputed
  pub fn new(mut provider: P, corpus_titles: &[String]) -> Result<Self> {
    let corpus_embeddings =
      if corpus_titles.is_empty() { Vec::new() } else { provider.encode_batch(corpus_titles)? };

    if corpus_embeddings.len() != corpus_titles.len() {
      return Err(CourseFinderError::embedding(format!(
        "provider returned {} embeddings for {} titles",
        corpus_embeddings.len(),
        corpus_titles.len()
      )));
    }

    let dimension = corpus_embeddings.first().map(Vec::len);
    for (index, embedding) in corpus_embeddings.iter().enumerate() {
      check_finite(embedding, &corpus_titles[index])?;
      if Some(embedding.len()) != dimension {
        return Err(CourseFinderError::embedding(format!(
          "title {index} embedded to {} dimensions, expected {}",
          embedding.len(),
          dimension.unwrap_or_default()
        )));
      }
    }

    debug!(titles = corpus_titles.len(), dimension = ?dimension, "corpus embeddings ready");
    Ok(Self { provider, corpus_embeddings })
  }

  /// Embedding width, or `None` for an empty corpus
  pub fn dimension(&self) -> Option<usize> {
    self.corpus_embeddings.first().map(Vec::len)
  }

  /// Rank the corpus against `query`, best first, at most `top_k` entries
  ///
  /// Equal scores keep corpus order.
  pub fn recommend(&mut self, query: &str, top_k: usize) -> Result<Vec<Match>> {
    validate_top_k(top_k)?;

    let Some(dimension) = self.dimension() else {
      return Ok(Vec::new());
    };

    let query_embedding = self.provider.encode(query)?;
    check_finite(&query_embedding, query)?;
    if query_embedding.len() != dimension {
      return Err(CourseFinderError::embedding(format!(
        "query embedded to {} dimensions, corpus uses {dimension}",
        query_embedding.len()
      )));
    }

    let scores: Vec<f32> = self
      .corpus_embeddings
      .iter()
      .map(|embedding| cosine_similarity(&query_embedding, embedding))
      .collect();

    Ok(select_top_k(&scores, top_k))
  }
}

/// One-shot ranking without keeping the corpus table around
pub fn recommend<P: EmbeddingProvider + ?Sized>(
  provider: &mut P,
  query: &str,
  corpus_titles: &[String],
  top_k: usize,
) -> Result<Vec<Match>> {
  validate_top_k(top_k)?;
  Ranker::new(provider, corpus_titles)?.recommend(query, top_k)
}

fn validate_top_k(top_k: usize) -> Result<()> {
  if top_k == 0 {
    return Err(CourseFinderError::invalid_argument("top_k must be at least 1"));
  }
  Ok(())
}

fn check_finite(embedding: &[f32], text: &str) -> Result<()> {
  if embedding.iter().all(|value| value.is_finite()) {
    Ok(())
  } else {
    let preview: String = text.chars().take(50).collect();
    Err(CourseFinderError::embedding(format!("non-finite embedding for '{preview}'")))
  }
}

/// Stable descending sort, then cut to `top_k`; non-finite scores count as 0.0
fn select_top_k(scores: &[f32], top_k: usize) -> Vec<Match> {
  let mut matches: Vec<Match> = scores
    .iter()
    .enumerate()
    .map(|(index, &score)| Match { index, score: if score.is_finite() { score } else { 0.0 } })
    .collect();

  matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
  matches.truncate(top_k);
  matches
}
