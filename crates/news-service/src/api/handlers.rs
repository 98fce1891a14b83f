//! Route handler functions.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use news_types::{ClusteringRequest, ClusteringResponse};

use super::error::ApiError;
use super::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "News Clustering API is running".to_string(),
    })
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// POST {api_prefix}/cluster
///
/// Validates the batch, then runs the full pipeline. Invalid batches are
/// 400; any pipeline failure is 500 with the error text.
pub async fn cluster(
    State(state): State<AppState>,
    Json(request): Json<ClusteringRequest>,
) -> Result<Json<ClusteringResponse>, ApiError> {
    request.validate()?;

    info!(
        articles = request.articles.len(),
        "Received clustering request"
    );

    let clusters = state
        .service
        .process_articles(&request.articles)
        .await
        .map_err(|e| {
            error!(error = %e, "Error processing clustering request");
            ApiError::from(e)
        })?;

    Ok(Json(ClusteringResponse { clusters }))
}
