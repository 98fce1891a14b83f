//! # news-types
//!
//! Shared domain types for the news clustering service.
//!
//! This crate defines the data structures exchanged between the pipeline
//! stages and over the HTTP API:
//! - Articles: `{id, content}` input documents
//! - Clusters: grouped article ids with a generated title and summary
//! - Settings: layered configuration for every component
//!
//! ## Usage
//!
//! ```rust
//! use news_types::{Article, ClusteringRequest};
//!
//! let request = ClusteringRequest::new(vec![Article::new("1", "Markets rallied today")]);
//! assert!(request.validate().is_ok());
//! ```

pub mod article;
pub mod config;
pub mod error;

pub use article::{
    Article, ArticleBatch, ArticleCluster, BatchReport, ClusteringRequest, ClusteringResponse,
    ReportedCluster,
};
pub use config::{
    ClusteringSettings, DistanceMetricSetting, EmbeddingSettings, NoisePolicySetting, Settings,
    SummarizerProvider, SummarizerSettings,
};
pub use error::NewsError;
