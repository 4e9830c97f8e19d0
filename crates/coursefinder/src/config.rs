//! Configuration management
//!
//! Settings come from, lowest to highest precedence: built-in defaults, a
//! JSON config file, `COURSEFINDER_*` environment variables, and CLI flags
//! (applied by the binary).

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::error::{CourseFinderError, Result};

pub const ENV_CORPUS: &str = "COURSEFINDER_CORPUS";
pub const ENV_TOP_K: &str = "COURSEFINDER_TOP_K";
pub const ENV_BACKEND: &str = "COURSEFINDER_BACKEND";

const LOCAL_CONFIG_FILES: &[&str] = &[".coursefinder.json", "coursefinder.json"];

/// Which embedding provider to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  /// Pretrained sentence-transformer through ONNX Runtime
  Onnx,
  /// Offline word-hashing embeddings
  Hash,
}

impl Default for Backend {
  fn default() -> Self {
    if cfg!(feature = "neural") {
      Backend::Onnx
    } else {
      Backend::Hash
    }
  }
}

impl FromStr for Backend {
  type Err = CourseFinderError;

  fn from_str(value: &str) -> Result<Self> {
    match value.trim().to_ascii_lowercase().as_str() {
      "onnx" => Ok(Backend::Onnx),
      "hash" => Ok(Backend::Hash),
      other => Err(CourseFinderError::invalid_argument(format!(
        "unknown backend '{other}' (expected 'onnx' or 'hash')"
      ))),
    }
  }
}

/// Where the sentence-transformer comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSettings {
  /// Hugging Face model repository
  #[serde(default = "default_model_repo")]
  pub repo: String,
  /// ONNX graph path inside the repository
  #[serde(default = "default_model_file")]
  pub model_file: String,
  /// Tokenizer path inside the repository
  #[serde(default = "default_tokenizer_file")]
  pub tokenizer_file: String,
  /// Local directory with `model.onnx` and `tokenizer.json`; skips the hub
  #[serde(default)]
  pub model_dir: Option<PathBuf>,
  /// Tokens per text before truncation
  #[serde(default = "default_max_length")]
  pub max_length: usize,
}

fn default_model_repo() -> String {
  "sentence-transformers/all-mpnet-base-v2".to_string()
}
fn default_model_file() -> String {
  "onnx/model.onnx".to_string()
}
fn default_tokenizer_file() -> String {
  "tokenizer.json".to_string()
}
fn default_max_length() -> usize {
  384
}

impl Default for ModelSettings {
  fn default() -> Self {
    Self {
      repo: default_model_repo(),
      model_file: default_model_file(),
      tokenizer_file: default_tokenizer_file(),
      model_dir: None,
      max_length: default_max_length(),
    }
  }
}

/// Values given on the command line; each one beats the file and the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
  pub corpus_path: Option<PathBuf>,
  pub top_k: Option<usize>,
  pub backend: Option<Backend>,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
  /// Course catalog file
  #[serde(default = "default_corpus_path")]
  pub corpus_path: PathBuf,
  /// Results per query
  #[serde(default = "default_top_k")]
  pub top_k: usize,
  #[serde(default)]
  pub backend: Backend,
  #[serde(default)]
  pub model: ModelSettings,
  /// Vector width for the hash backend
  #[serde(default = "default_hash_dimension")]
  pub hash_dimension: usize,
}

fn default_corpus_path() -> PathBuf {
  PathBuf::from("Data_free_course.csv")
}
fn default_top_k() -> usize {
  5
}
fn default_hash_dimension() -> usize {
  crate::embedding::hashed::DEFAULT_DIMENSION
}

impl Default for Config {
  fn default() -> Self {
    Self {
      corpus_path: default_corpus_path(),
      top_k: default_top_k(),
      backend: Backend::default(),
      model: ModelSettings::default(),
      hash_dimension: default_hash_dimension(),
    }
  }
}

impl Config {
  /// Resolve the effective configuration: file (explicit or discovered), then
  /// environment, then command line overrides; validated once at the end
  pub fn load(explicit: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
    let mut config = match explicit {
      Some(path) => Self::load_from_file(path)?,
      None => Self::discover()?,
    };

    config.apply_env_overrides(overrides)?;
    config.apply_overrides(overrides);
    config.validate()?;
    Ok(config)
  }

  /// Load configuration from a file
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
      .map_err(|e| CourseFinderError::config(path, format!("cannot read file: {e}")))?;
    let config: Config =
      serde_json::from_str(&content).map_err(|e| CourseFinderError::config(path, e.to_string()))?;

    debug!(path = %path.display(), "loaded configuration file");
    Ok(config)
  }

  /// Load configuration from the first known location, or defaults
  pub fn discover() -> Result<Self> {
    for path in Self::search_paths() {
      if path.exists() {
        return Self::load_from_file(path);
      }
    }

    // No config file found, use defaults
    Ok(Config::default())
  }

  /// Candidate config files, most specific first
  pub fn search_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = LOCAL_CONFIG_FILES.iter().map(PathBuf::from).collect();
    if let Some(dir) = dirs::config_dir() {
      paths.push(dir.join("coursefinder").join("config.json"));
    }
    paths
  }

  /// Read `COURSEFINDER_*` variables for every setting the command line left unset
  pub fn apply_env_overrides(&mut self, overrides: &ConfigOverrides) -> Result<()> {
    if overrides.corpus_path.is_none() {
      if let Ok(corpus) = env::var(ENV_CORPUS) {
        self.corpus_path = PathBuf::from(corpus);
      }
    }

    if overrides.top_k.is_none() {
      if let Ok(top_k) = env::var(ENV_TOP_K) {
        self.top_k = top_k.trim().parse().map_err(|_| {
          CourseFinderError::invalid_argument(format!("{ENV_TOP_K} must be a positive integer, got '{top_k}'"))
        })?;
      }
    }

    if overrides.backend.is_none() {
      if let Ok(backend) = env::var(ENV_BACKEND) {
        self.backend = backend.parse()?;
      }
    }

    Ok(())
  }

  pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
    if let Some(corpus) = &overrides.corpus_path {
      self.corpus_path = corpus.clone();
    }
    if let Some(top_k) = overrides.top_k {
      self.top_k = top_k;
    }
    if let Some(backend) = overrides.backend {
      self.backend = backend;
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.top_k == 0 {
      return Err(CourseFinderError::invalid_argument("top_k must be at least 1"));
    }
    if self.hash_dimension == 0 {
      return Err(CourseFinderError::invalid_argument("hash_dimension must be at least 1"));
    }
    if self.model.max_length == 0 {
      return Err(CourseFinderError::invalid_argument("model.max_length must be at least 1"));
    }
    Ok(())
  }

}
