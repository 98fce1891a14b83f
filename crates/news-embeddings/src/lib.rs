//! # news-embeddings
//!
//! Sentence embeddings for news articles using Candle.
//!
//! Articles are mapped to fixed-length vectors with a multilingual
//! sentence-transformer so that Korean and English news land in the same
//! semantic space.
//!
//! ## Features
//! - Local inference via Candle (no Python, no API)
//! - paraphrase-multilingual-MiniLM-L12-v2 by default (384 dimensions)
//! - Automatic model file caching from HuggingFace Hub
//! - Lazy model loading on first use
//! - Deterministic mock embedders for tests

pub mod cache;
pub mod candle;
pub mod error;
pub mod lazy;
pub mod mock;
pub mod model;

pub use crate::candle::CandleEmbedder;
pub use cache::{get_or_download_model, ModelCache, ModelPaths, DEFAULT_MODEL_REPO, MODEL_FILES};
pub use error::EmbeddingError;
pub use lazy::LazyEmbedder;
pub use mock::{KeywordEmbedder, MockEmbedder};
pub use model::{Embedding, EmbeddingModel, ModelInfo};
