use std::collections::HashMap;
use std::path::{Path, PathBuf};

use hf_hub::api::tokio::Api;
use ndarray::{Array2, ArrayView2, ArrayView3, Axis};
use ort::execution_providers::{CPUExecutionProvider, ExecutionProviderDispatch};
use ort::session::{builder::GraphOptimizationLevel, Session, SessionOutputs};
use ort::value::Value;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info, warn};

#[cfg(target_os = "linux")]
use ort::execution_providers::CUDAExecutionProvider;
#[cfg(target_os = "macos")]
use ort::execution_providers::CoreMLExecutionProvider;

use crate::config::ModelSettings;
use crate::embedding::{Embedding, EmbeddingProvider};
use crate::error::{CourseFinderError, Result};
use crate::similarity;

const LOCAL_MODEL_FILE: &str = "model.onnx";
const LOCAL_TOKENIZER_FILE: &str = "tokenizer.json";

/// Sentence-transformer run through ONNX Runtime
pub struct OnnxEmbedder {
  session: Session,
  tokenizer: Tokenizer,
  pad_id: u32,
  wants_token_type_ids: bool,
}

struct ModelFiles {
  tokenizer_file: PathBuf,
  model_path: PathBuf,
}

/// Token ids padded to a rectangular `[batch, length]` layout
#[derive(Debug, PartialEq)]
struct PaddedBatch {
  ids: Vec<i64>,
  mask: Vec<i64>,
  batch: usize,
  length: usize,
}

// Public API
impl OnnxEmbedder {
  /// Fetch (or read locally) the model and tokenizer and open an inference session
  pub async fn load(settings: &ModelSettings) -> Result<Self> {
    info!(repo = %settings.repo, "loading embedding model");

    let files = Self::locate_model_files(settings).await?;
    let tokenizer = Self::load_tokenizer(&files.tokenizer_file, settings.max_length)?;
    let pad_id = Self::pad_token_id(&tokenizer);
    let session = Self::load_session(&files.model_path)?;

    let wants_token_type_ids = session.inputs.iter().any(|input| input.name == "token_type_ids");
    debug!(pad_id, wants_token_type_ids, "model inputs resolved");
    info!("embedding model loaded");

    Ok(Self { session, tokenizer, pad_id, wants_token_type_ids })
  }
}

// Model initialization
impl OnnxEmbedder {
  async fn locate_model_files(settings: &ModelSettings) -> Result<ModelFiles> {
    if let Some(dir) = &settings.model_dir {
      return Self::local_model_files(dir);
    }

    let api = Api::new()
      .map_err(|e| CourseFinderError::model_load(format!("HF API initialization failed: {e}")))?;
    let repo = api.model(settings.repo.clone());

    let tokenizer_file = repo.get(&settings.tokenizer_file).await.map_err(|e| {
      CourseFinderError::model_load(format!(
        "Failed to download {} from {}: {e}",
        settings.tokenizer_file, settings.repo
      ))
    })?;

    let model_path = repo.get(&settings.model_file).await.map_err(|e| {
      CourseFinderError::model_load(format!(
        "Failed to download {} from {}: {e}",
        settings.model_file, settings.repo
      ))
    })?;

    Ok(ModelFiles { tokenizer_file, model_path })
  }

  fn local_model_files(dir: &Path) -> Result<ModelFiles> {
    let files = ModelFiles {
      tokenizer_file: dir.join(LOCAL_TOKENIZER_FILE),
      model_path: dir.join(LOCAL_MODEL_FILE),
    };

    for path in [&files.tokenizer_file, &files.model_path] {
      if !path.exists() {
        return Err(CourseFinderError::model_load(format!("{} not found", path.display())));
      }
    }

    Ok(files)
  }

  fn load_tokenizer(path: &Path, max_length: usize) -> Result<Tokenizer> {
    let mut tokenizer = Tokenizer::from_file(path)
      .map_err(|e| CourseFinderError::model_load(format!("Failed to load tokenizer: {e}")))?;

    tokenizer
      .with_truncation(Some(TruncationParams { max_length, ..Default::default() }))
      .map_err(|e| CourseFinderError::model_load(format!("Failed to configure truncation: {e}")))?;

    Ok(tokenizer)
  }

  fn pad_token_id(tokenizer: &Tokenizer) -> u32 {
    tokenizer
      .get_padding()
      .map(|padding| padding.pad_id)
      .or_else(|| tokenizer.token_to_id("<pad>"))
      .or_else(|| tokenizer.token_to_id("[PAD]"))
      .unwrap_or(0)
  }

  fn load_session(model_path: &Path) -> Result<Session> {
    let model_error = |e: &dyn std::fmt::Display| {
      CourseFinderError::model_load(format!("Failed to load ONNX model: {e}"))
    };

    Session::builder()
      .map_err(|e| model_error(&e))?
      .with_optimization_level(GraphOptimizationLevel::Level1)
      .map_err(|e| model_error(&e))?
      .with_execution_providers(Self::execution_providers())
      .map_err(|e| model_error(&e))?
      .commit_from_file(model_path)
      .map_err(|e| model_error(&e))
  }
}

// Hardware detection
impl OnnxEmbedder {
  fn execution_providers() -> Vec<ExecutionProviderDispatch> {
    let mut providers = Vec::new();

    #[cfg(target_os = "macos")]
    {
      providers.push(CoreMLExecutionProvider::default().build());
    }

    #[cfg(target_os = "linux")]
    {
      if Self::is_cuda_available() {
        providers.push(CUDAExecutionProvider::default().build());
      }
    }

    providers.push(CPUExecutionProvider::default().build());
    providers
  }

  #[cfg(target_os = "linux")]
  fn is_cuda_available() -> bool {
    std::process::Command::new("nvidia-smi")
      .output()
      .map(|output| output.status.success())
      .unwrap_or(false)
  }
}

// Inference
impl OnnxEmbedder {
  fn run_batch(&mut self, texts: &[String]) -> Result<Vec<Embedding>> {
    let encodings = self
      .tokenizer
      .encode_batch(texts.to_vec(), true)
      .map_err(|e| CourseFinderError::embedding(format!("Tokenization failed: {e}")))?;

    let rows: Vec<(&[u32], &[u32])> =
      encodings.iter().map(|e| (e.get_ids(), e.get_attention_mask())).collect();
    let batch = pad_batch(&rows, self.pad_id);
    debug!(batch = batch.batch, length = batch.length, "running inference");

    let inputs = self.prepare(&batch)?;
    let outputs = self
      .session
      .run(inputs)
      .map_err(|e| CourseFinderError::embedding(format!("Inference failed: {e}")))?;

    let embeddings = extract_embeddings(&outputs, &batch)?;
    Ok(embeddings.into_iter().map(similarity::normalize).collect())
  }

  fn prepare(&self, batch: &PaddedBatch) -> Result<HashMap<String, Value>> {
    let mut inputs = HashMap::new();
    inputs.insert("input_ids".to_string(), to_tensor(batch, batch.ids.clone())?);
    inputs.insert("attention_mask".to_string(), to_tensor(batch, batch.mask.clone())?);

    if self.wants_token_type_ids {
      inputs.insert("token_type_ids".to_string(), to_tensor(batch, vec![0; batch.ids.len()])?);
    }

    Ok(inputs)
  }
}

impl EmbeddingProvider for OnnxEmbedder {
  fn name(&self) -> &'static str {
    "onnx"
  }

  fn encode_batch(&mut self, texts: &[String]) -> Result<Vec<Embedding>> {
    if texts.is_empty() {
      return Ok(vec![]);
    }
    self.run_batch(texts)
  }
}

fn to_tensor(batch: &PaddedBatch, values: Vec<i64>) -> Result<Value> {
  let array = Array2::from_shape_vec((batch.batch, batch.length), values)
    .map_err(|e| CourseFinderError::embedding(format!("Bad input shape: {e}")))?;
  let tensor: Value = Value::from_array(array)
    .map_err(|e| CourseFinderError::embedding(format!("Failed to build input tensor: {e}")))?
    .into();
  Ok(tensor)
}

fn extract_embeddings(outputs: &SessionOutputs<'_>, batch: &PaddedBatch) -> Result<Vec<Embedding>> {
  let first;
  let output = match outputs.get("last_hidden_state") {
    Some(output) => output,
    None => {
      first = outputs.values().next().ok_or_else(|| CourseFinderError::embedding("model produced no outputs"))?;
      warn!("model has no 'last_hidden_state' output, using the first output");
      &*first
    }
  };

  let (shape, data) = output
    .try_extract_tensor::<f32>()
    .map_err(|e| CourseFinderError::embedding(format!("Unexpected output tensor: {e}")))?;
  let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();

  pool_output(&dims, data, batch)
}

/// Pad every row to the longest one; padding positions get `pad_id` and mask 0
fn pad_batch(rows: &[(&[u32], &[u32])], pad_id: u32) -> PaddedBatch {
  let batch = rows.len();
  let length = rows.iter().map(|(ids, _)| ids.len()).max().unwrap_or(0);

  let mut ids = Vec::with_capacity(batch * length);
  let mut mask = Vec::with_capacity(batch * length);

  for (row_ids, row_mask) in rows {
    for i in 0..length {
      match (row_ids.get(i), row_mask.get(i)) {
        (Some(&id), Some(&m)) => {
          ids.push(i64::from(id));
          mask.push(i64::from(m));
        }
        _ => {
          ids.push(i64::from(pad_id));
          mask.push(0);
        }
      }
    }
  }

  PaddedBatch { ids, mask, batch, length }
}

/// Turn a model output into one vector per input row
///
/// `[batch, tokens, hidden]` outputs are mean-pooled over unmasked tokens;
/// `[batch, hidden]` outputs are already pooled.
fn pool_output(dims: &[usize], data: &[f32], batch: &PaddedBatch) -> Result<Vec<Embedding>> {
  match dims {
    [rows, tokens, hidden] => {
      if *rows != batch.batch || *tokens != batch.length {
        return Err(CourseFinderError::embedding(format!(
          "output shape {dims:?} does not match input batch [{}, {}]",
          batch.batch, batch.length
        )));
      }
      let hidden_states = ArrayView3::from_shape((*rows, *tokens, *hidden), data)
        .map_err(|e| CourseFinderError::embedding(format!("Bad output shape: {e}")))?;
      Ok(masked_mean_pool(hidden_states, &batch.mask))
    }
    [rows, hidden] => {
      if *rows != batch.batch {
        return Err(CourseFinderError::embedding(format!(
          "output has {rows} rows for {} inputs",
          batch.batch
        )));
      }
      let pooled = ArrayView2::from_shape((*rows, *hidden), data)
        .map_err(|e| CourseFinderError::embedding(format!("Bad output shape: {e}")))?;
      Ok(pooled.outer_iter().map(|row| row.to_vec()).collect())
    }
    _ => Err(CourseFinderError::embedding(format!("unsupported output rank: {dims:?}"))),
  }
}

fn masked_mean_pool(hidden_states: ArrayView3<'_, f32>, mask: &[i64]) -> Vec<Embedding> {
  let length = hidden_states.len_of(Axis(1));
  let hidden = hidden_states.len_of(Axis(2));

  hidden_states
    .outer_iter()
    .enumerate()
    .map(|(row, tokens)| {
      let mut pooled = vec![0.0f32; hidden];
      let mut count = 0.0f32;

      for (position, token) in tokens.outer_iter().enumerate() {
        if mask[row * length + position] == 0 {
          continue;
        }
        count += 1.0;
        for (slot, &value) in pooled.iter_mut().zip(token.iter()) {
          *slot += value;
        }
      }

      if count > 0.0 {
        for slot in pooled.iter_mut() {
          *slot /= count;
        }
      }
      pooled
    })
    .collect()
}
