//! Course search facade
//!
//! Owns the catalog and a ranker built over its titles, and resolves ranked
//! positions back to the catalog rows the presentation layer renders.

use serde::Serialize;
use tracing::{debug, info};

use crate::corpus::{Corpus, Course};
use crate::embedding::EmbeddingProvider;
use crate::error::{CourseFinderError, Result};
use crate::ranker::Ranker;

/// A ranked course, borrowed from the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation<'a> {
  pub index: usize,
  pub course: &'a Course,
  pub score: f32,
}

pub struct CourseSearch<P> {
  corpus: Corpus,
  ranker: Ranker<P>,
}

impl<P: EmbeddingProvider> CourseSearch<P> {
  /// Embed the catalog titles once and keep them for every later query
  pub fn new(corpus: Corpus, provider: P) -> Result<Self> {
    info!(courses = corpus.len(), provider = provider.name(), "indexing course titles");
    let ranker = Ranker::new(provider, &corpus.titles())?;
    Ok(Self { corpus, ranker })
  }

  pub fn corpus(&self) -> &Corpus {
    &self.corpus
  }

  pub fn search(&mut self, query: &str, top_k: usize) -> Result<Vec<Recommendation<'_>>> {
    let matches = self.ranker.recommend(query, top_k)?;
    debug!(query, top_k, found = matches.len(), "ranked catalog");

    matches
      .into_iter()
      .map(|m| {
        let course = self.corpus.get(m.index).ok_or_else(|| {
          CourseFinderError::embedding(format!("ranker returned unknown course index {}", m.index))
        })?;
        Ok(Recommendation { index: m.index, course, score: m.score })
      })
      .collect()
  }
}
