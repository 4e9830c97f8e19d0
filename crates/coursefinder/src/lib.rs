//! Coursefinder - Smart Course Search
//!
//! Ranks a fixed catalog of courses by how close their titles are to a
//! free-text query in embedding space, and returns the best matches with
//! their cosine similarity scores.

pub mod config;
pub mod corpus;
pub mod display;
pub mod embedding;
pub mod error;
pub mod interactive;
pub mod logging;
pub mod ranker;
pub mod search;
pub mod similarity;

pub use config::{Backend, Config};
pub use corpus::{Corpus, Course};
pub use embedding::{Embedding, EmbeddingProvider, HashEmbedder};
pub use error::{CourseFinderError, Result};
pub use ranker::{recommend, Match, Ranker};
pub use search::{CourseSearch, Recommendation};
