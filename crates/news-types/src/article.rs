//! Article and cluster types.
//!
//! These are the wire types of the `/cluster` endpoint and the batch CLI.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::NewsError;

/// A single news article submitted for clustering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Caller-assigned identifier, echoed back in cluster membership lists
    pub id: String,
    /// Article body used for embedding and summarization
    pub content: String,
}

impl Article {
    /// Create a new article.
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// A topical group of articles with a generated title and summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleCluster {
    /// Cluster identifier (HDBSCAN label, or a number after the highest label for noise singletons)
    pub cluster_id: i64,
    /// Member article ids in input order
    pub articles: Vec<String>,
    /// Short title produced by the summarizer
    pub topic_title: String,
    /// One-line summary produced by the summarizer
    pub topic_summary: String,
}

/// Request body for `POST /cluster`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringRequest {
    pub articles: Vec<Article>,
}

impl ClusteringRequest {
    /// Create a request from a list of articles.
    pub fn new(articles: Vec<Article>) -> Self {
        Self { articles }
    }

    /// Validate the request before it enters the pipeline.
    ///
    /// Rejects empty batches, blank ids, blank content and duplicate ids.
    pub fn validate(&self) -> Result<(), NewsError> {
        if self.articles.is_empty() {
            return Err(NewsError::InvalidInput("No articles provided".to_string()));
        }

        let mut seen = HashSet::with_capacity(self.articles.len());
        for (index, article) in self.articles.iter().enumerate() {
            if article.id.trim().is_empty() {
                return Err(NewsError::InvalidInput(format!(
                    "Article at index {} has an empty id",
                    index
                )));
            }
            if article.content.trim().is_empty() {
                return Err(NewsError::InvalidInput(format!(
                    "Article '{}' has empty content",
                    article.id
                )));
            }
            if !seen.insert(article.id.as_str()) {
                return Err(NewsError::InvalidInput(format!(
                    "Duplicate article id '{}'",
                    article.id
                )));
            }
        }

        Ok(())
    }
}

/// Response body for `POST /cluster`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringResponse {
    pub clusters: Vec<ArticleCluster>,
}

/// Articles loaded from a JSON document on disk.
#[derive(Debug, Clone, Default)]
pub struct ArticleBatch {
    pub articles: Vec<Article>,
}

impl ArticleBatch {
    /// Parse articles from a JSON value.
    ///
    /// Two layouts are accepted:
    /// - a bare array of `{id, content}` objects; malformed items are skipped
    /// - an object with an `articles` key in the request format; every item must be valid
    pub fn from_json(value: serde_json::Value) -> Result<Self, NewsError> {
        match value {
            serde_json::Value::Array(items) => {
                let articles = items
                    .into_iter()
                    .filter_map(|item| serde_json::from_value::<Article>(item).ok())
                    .collect();
                Ok(Self { articles })
            }
            serde_json::Value::Object(mut map) if map.contains_key("articles") => {
                let articles = map.remove("articles").unwrap_or_default();
                let articles: Vec<Article> = serde_json::from_value(articles)?;
                Ok(Self { articles })
            }
            _ => Err(NewsError::InvalidInput(
                "Expected a list of articles or an object with an 'articles' key".to_string(),
            )),
        }
    }

    /// Parse articles from JSON text.
    pub fn parse(text: &str) -> Result<Self, NewsError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Self::from_json(value)
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }
}

/// A cluster entry in the batch report, with its member count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportedCluster {
    pub cluster_id: i64,
    pub articles: Vec<String>,
    pub topic_title: String,
    pub topic_summary: String,
    pub article_count: usize,
}

impl From<&ArticleCluster> for ReportedCluster {
    fn from(cluster: &ArticleCluster) -> Self {
        Self {
            cluster_id: cluster.cluster_id,
            articles: cluster.articles.clone(),
            topic_title: cluster.topic_title.clone(),
            topic_summary: cluster.topic_summary.clone(),
            article_count: cluster.articles.len(),
        }
    }
}

/// Output document written by the batch CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub total_articles: usize,
    pub total_clusters: usize,
    pub clusters: Vec<ReportedCluster>,
}

impl BatchReport {
    /// Build a report for `total_articles` inputs grouped into `clusters`.
    pub fn new(total_articles: usize, clusters: &[ArticleCluster]) -> Self {
        Self {
            total_articles,
            total_clusters: clusters.len(),
            clusters: clusters.iter().map(ReportedCluster::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_ok() {
        let request = ClusteringRequest::new(vec![
            Article::new("1", "Election results announced"),
            Article::new("2", "Team wins the cup"),
        ]);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_empty() {
        let request = ClusteringRequest::new(vec![]);
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("No articles provided"));
    }

    #[test]
    fn test_validate_duplicate_ids() {
        let request = ClusteringRequest::new(vec![
            Article::new("a", "first"),
            Article::new("a", "second"),
        ]);
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_validate_blank_content() {
        let request = ClusteringRequest::new(vec![Article::new("a", "   \n")]);
        assert!(matches!(request.validate(), Err(NewsError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_blank_id() {
        let request = ClusteringRequest::new(vec![Article::new(" ", "text")]);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_wire_format() {
        let body = r#"{"articles":[{"id":"1","content":"트럼프 취임식 연설"}]}"#;
        let request: ClusteringRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.articles[0].id, "1");
        assert_eq!(request.articles[0].content, "트럼프 취임식 연설");
    }

    #[test]
    fn test_cluster_wire_format() {
        let cluster = ArticleCluster {
            cluster_id: 0,
            articles: vec!["1".to_string(), "2".to_string()],
            topic_title: "Title".to_string(),
            topic_summary: "Summary".to_string(),
        };
        let value = serde_json::to_value(&cluster).unwrap();
        assert_eq!(
            value,
            json!({
                "cluster_id": 0,
                "articles": ["1", "2"],
                "topic_title": "Title",
                "topic_summary": "Summary"
            })
        );
    }

    #[test]
    fn test_batch_from_bare_array_skips_malformed() {
        let value = json!([
            {"id": "1", "content": "one"},
            {"id": "2"},
            "not an article",
            {"id": "3", "content": "three"}
        ]);
        let batch = ArticleBatch::from_json(value).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.articles[1].id, "3");
    }

    #[test]
    fn test_batch_from_request_format() {
        let value = json!({"articles": [{"id": "1", "content": "one"}]});
        let batch = ArticleBatch::from_json(value).unwrap();
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_batch_request_format_rejects_malformed_item() {
        let value = json!({"articles": [{"id": "1"}]});
        assert!(ArticleBatch::from_json(value).is_err());
    }

    #[test]
    fn test_batch_rejects_other_shapes() {
        assert!(ArticleBatch::from_json(json!({"items": []})).is_err());
        assert!(ArticleBatch::from_json(json!(42)).is_err());
    }

    #[test]
    fn test_batch_report_counts() {
        let clusters = vec![ArticleCluster {
            cluster_id: 3,
            articles: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            topic_title: "t".to_string(),
            topic_summary: "s".to_string(),
        }];
        let report = BatchReport::new(5, &clusters);
        assert_eq!(report.total_articles, 5);
        assert_eq!(report.total_clusters, 1);
        assert_eq!(report.clusters[0].article_count, 3);
    }
}
