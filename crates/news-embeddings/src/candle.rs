//! Candle-based sentence embedder.
//!
//! Runs a BERT-architecture sentence-transformer (the multilingual MiniLM by
//! default) on CPU with masked mean pooling.

use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use serde::Deserialize;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

use crate::cache::{get_or_download_model, ModelCache};
use crate::error::EmbeddingError;
use crate::model::{Embedding, EmbeddingModel, ModelInfo};

/// Maximum sequence length; longer articles are truncated.
pub const MAX_SEQ_LENGTH: usize = 128;

/// Default number of texts per forward pass
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Fields of config.json needed before the model is built.
#[derive(Debug, Deserialize)]
struct ModelShape {
    hidden_size: usize,
    max_position_embeddings: usize,
}

/// Candle-based sentence embedder.
pub struct CandleEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    info: ModelInfo,
    pad_id: u32,
    max_len: usize,
    batch_size: usize,
}

impl CandleEmbedder {
    /// Load the embedding model from cache (downloading if needed).
    pub fn load(cache: &ModelCache, batch_size: usize) -> Result<Self, EmbeddingError> {
        let paths = get_or_download_model(cache)?;
        let mut embedder =
            Self::load_from_paths(&paths.config, &paths.tokenizer, &paths.weights)?;
        embedder.info.name = cache.model_name().to_string();
        embedder.batch_size = batch_size.max(1);
        Ok(embedder)
    }

    /// Load the default model with default cache settings
    pub fn load_default() -> Result<Self, EmbeddingError> {
        Self::load(&ModelCache::default(), DEFAULT_BATCH_SIZE)
    }

    /// Load from explicit file paths
    pub fn load_from_paths(
        config_path: &Path,
        tokenizer_path: &Path,
        weights_path: &Path,
    ) -> Result<Self, EmbeddingError> {
        for path in [config_path, tokenizer_path, weights_path] {
            if !path.exists() {
                return Err(EmbeddingError::ModelNotFound(path.display().to_string()));
            }
        }

        info!("Loading embedding model...");

        let device = Device::Cpu;

        let config_str = std::fs::read_to_string(config_path)?;
        let shape: ModelShape = serde_json::from_str(&config_str)
            .map_err(|e| EmbeddingError::ModelNotFound(format!("Invalid config: {}", e)))?;
        let config: BertConfig = serde_json::from_str(&config_str)
            .map_err(|e| EmbeddingError::ModelNotFound(format!("Invalid config: {}", e)))?;

        let max_len = MAX_SEQ_LENGTH.min(shape.max_position_embeddings);
        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;
        let tokenizer = with_truncation(tokenizer, max_len)?;

        // XLM-R vocabularies pad with "<pad>", classic BERT ones with "[PAD]"
        let pad_id = tokenizer
            .token_to_id("<pad>")
            .or_else(|| tokenizer.token_to_id("[PAD]"))
            .unwrap_or(0);

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path.to_path_buf()], DType::F32, &device)?
        };
        let model = BertModel::load(vb, &config)?;

        info!(
            dim = shape.hidden_size,
            max_seq = max_len,
            "Model loaded successfully"
        );

        Ok(Self {
            model,
            tokenizer,
            device,
            info: ModelInfo {
                name: "sentence-transformer".to_string(),
                dimension: shape.hidden_size,
                max_sequence_length: max_len,
            },
            pad_id,
            max_len,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Mean pooling over token embeddings (excluding padding)
    fn mean_pooling(
        &self,
        embeddings: &Tensor,
        attention_mask: &Tensor,
    ) -> Result<Tensor, EmbeddingError> {
        let mask = attention_mask
            .unsqueeze(2)?
            .broadcast_as(embeddings.shape())?
            .to_dtype(DType::F32)?;

        let sum = embeddings.broadcast_mul(&mask)?.sum(1)?;
        let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;

        Ok(sum.broadcast_div(&counts)?)
    }

    /// Run one forward pass over at most `batch_size` texts.
    fn embed_chunk(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;

        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0)
            .clamp(1, self.max_len);

        let mut ids_flat: Vec<u32> = Vec::with_capacity(texts.len() * seq_len);
        let mut mask_flat: Vec<u32> = Vec::with_capacity(texts.len() * seq_len);

        // Encodings are already truncated to max_len with special tokens kept
        for encoding in &encodings {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let pad = seq_len - ids.len().min(seq_len);

            ids_flat.extend_from_slice(&ids[..seq_len - pad]);
            mask_flat.extend_from_slice(&mask[..seq_len - pad]);
            ids_flat.extend(std::iter::repeat(self.pad_id).take(pad));
            mask_flat.extend(std::iter::repeat(0).take(pad));
        }

        let batch = texts.len();
        let input_ids = Tensor::from_vec(ids_flat, (batch, seq_len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask_flat, (batch, seq_len), &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;

        let output = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = self.mean_pooling(&output, &attention_mask)?;
        let rows: Vec<Vec<f32>> = pooled.to_vec2()?;

        Ok(rows.into_iter().map(Embedding::new).collect())
    }
}

/// Truncate encodings to `max_len` tokens, counting the special tokens the
/// post-processor adds, so `</s>` survives on long inputs.
fn with_truncation(mut tokenizer: Tokenizer, max_len: usize) -> Result<Tokenizer, EmbeddingError> {
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_len,
            ..Default::default()
        }))
        .map_err(|e| EmbeddingError::Tokenizer(e.to_string()))?;
    Ok(tokenizer)
}

impl EmbeddingModel for CandleEmbedder {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!(count = texts.len(), batch_size = self.batch_size, "Embedding articles");

        let mut embeddings = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            embeddings.extend(self.embed_chunk(chunk)?);
        }

        debug!(
            count = embeddings.len(),
            dim = self.info.dimension,
            "Embeddings generated"
        );

        Ok(embeddings)
    }
}
