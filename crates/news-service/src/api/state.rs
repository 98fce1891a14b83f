//! Application state shared across all route handlers.

use std::sync::Arc;

use news_types::Settings;

use crate::pipeline::NewsClusteringService;

/// HTTP-facing options taken from [`Settings`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Prefix of the clustering route (e.g., "/api/v1")
    pub api_prefix: String,
    /// Largest accepted request body in bytes
    pub max_body_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for ApiConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            api_prefix: settings.api_prefix.clone(),
            max_body_bytes: settings.max_body_bytes,
        }
    }
}

impl ApiConfig {
    /// Full path of the clustering endpoint.
    pub fn cluster_path(&self) -> String {
        format!("{}/cluster", self.api_prefix.trim_end_matches('/'))
    }
}

/// Shared application state.
///
/// Cloned into every handler task; all fields are behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<NewsClusteringService>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(service: NewsClusteringService, config: ApiConfig) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_path() {
        assert_eq!(ApiConfig::default().cluster_path(), "/api/v1/cluster");

        let config = ApiConfig {
            api_prefix: "/".to_string(),
            max_body_bytes: 1024,
        };
        assert_eq!(config.cluster_path(), "/cluster");

        let config = ApiConfig {
            api_prefix: "/news/v2/".to_string(),
            max_body_bytes: 1024,
        };
        assert_eq!(config.cluster_path(), "/news/v2/cluster");
    }
}
