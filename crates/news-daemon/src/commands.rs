//! Command implementations for the news-clusterer binary.
//!
//! Handles:
//! - serve: Load config, build the pipeline, run the HTTP API
//! - process: Cluster a JSON file of articles and report the result

use std::fs;
use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use news_service::{run_server_with_shutdown, ApiConfig, AppState, NewsClusteringService};
use news_types::{ArticleBatch, ArticleCluster, BatchReport, Settings};

/// Printed when an input file holds no usable articles.
pub const NO_ARTICLES_MESSAGE: &str = "No articles found in the JSON file";

/// Article ids listed per cluster in the console report.
const CONSOLE_ID_LIMIT: usize = 5;

/// Load settings and apply CLI overrides (highest precedence).
pub fn load_settings(
    config_path: Option<&str>,
    host_override: Option<&str>,
    port_override: Option<u16>,
    log_level_override: Option<&str>,
) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;

    if let Some(host) = host_override {
        settings.http_host = host.to_string();
    }
    if let Some(port) = port_override {
        settings.http_port = port;
    }
    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }

    Ok(settings)
}

/// Install the global tracing subscriber. `RUST_LOG` wins over `level`.
///
/// Logs go to stderr so that `process` output on stdout stays clean.
fn init_tracing(level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

/// Run the HTTP API until Ctrl+C or SIGTERM.
///
/// The embedding model is loaded on the first request, not here.
pub async fn start_server(
    config_path: Option<&str>,
    host_override: Option<&str>,
    port_override: Option<u16>,
    log_level_override: Option<&str>,
) -> Result<()> {
    let settings = load_settings(config_path, host_override, port_override, log_level_override)?;
    init_tracing(&settings.log_level)?;

    info!("News clusterer starting...");
    info!("Configuration:");
    info!("  HTTP address: {}", settings.http_addr());
    info!("  Cluster endpoint: {}/cluster", settings.api_prefix);
    info!("  Embedding model: {}", settings.embedding.repo_id);
    info!(
        "  Summarizer: {:?} / {}",
        settings.summarizer.provider, settings.summarizer.model
    );
    info!("  Log level: {}", settings.log_level);

    let service =
        NewsClusteringService::from_settings(&settings).context("Failed to build clustering service")?;
    let state = AppState::new(service, ApiConfig::from(&settings));

    let addr: SocketAddr = settings
        .http_addr()
        .parse()
        .context("Invalid HTTP address")?;

    run_server_with_shutdown(addr, state, shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}

/// Cluster the articles in `input` and report the result.
///
/// A missing input file is an error. A file with no usable articles prints
/// [`NO_ARTICLES_MESSAGE`] and succeeds without contacting any model.
pub async fn process_file(
    config_path: Option<&str>,
    input: &Path,
    output: Option<&Path>,
    show: bool,
    log_level_override: Option<&str>,
) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let settings = load_settings(config_path, None, None, log_level_override)?;
    init_tracing(&settings.log_level)?;

    process_input(&settings, input, output, show, &mut std::io::stdout()).await
}

/// Read `input` and run it through a service built from `settings`.
///
/// The service is only built once the batch is known to be non-empty.
pub async fn process_input<W: Write>(
    settings: &Settings,
    input: &Path,
    output: Option<&Path>,
    show: bool,
    out: &mut W,
) -> Result<()> {
    let batch = read_batch(input)?;
    if batch.is_empty() {
        writeln!(out, "{}", NO_ARTICLES_MESSAGE)?;
        return Ok(());
    }

    let service =
        NewsClusteringService::from_settings(settings).context("Failed to build clustering service")?;
    run_batch(&service, &batch, output, show, out).await?;
    Ok(())
}

/// Read and parse an article file.
pub fn read_batch(input: &Path) -> Result<ArticleBatch> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    ArticleBatch::parse(&text).with_context(|| format!("Invalid article file {}", input.display()))
}

/// Cluster `batch` and either write the report to `output` or print it to `out`.
pub async fn run_batch<W: Write>(
    service: &NewsClusteringService,
    batch: &ArticleBatch,
    output: Option<&Path>,
    show: bool,
    out: &mut W,
) -> Result<BatchReport> {
    writeln!(out, "Processing {} articles...", batch.len())?;

    let clusters = match service.process_articles(&batch.articles).await {
        Ok(clusters) => clusters,
        Err(e) => {
            writeln!(out, "Error processing articles: {}", e)?;
            return Err(e.into());
        }
    };
    let report = BatchReport::new(batch.len(), &clusters);

    match output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&report)?;
            fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            writeln!(out, "Results saved to: {}", path.display())?;

            if show {
                let separator = "=".repeat(60);
                let contents = fs::read_to_string(path)?;
                writeln!(out, "\n{}", separator)?;
                writeln!(out, "Output file contents:")?;
                writeln!(out, "{}", separator)?;
                writeln!(out, "{}", contents)?;
            }
        }
        None => write!(out, "{}", format_console_report(&clusters))?,
    }

    Ok(report)
}

/// Human-readable cluster listing.
///
/// Only the first five article ids of each cluster are listed.
pub fn format_console_report(clusters: &[ArticleCluster]) -> String {
    let mut report = String::new();
    report.push_str("\nClustering Results:\n");
    report.push_str(&format!("Total clusters found: {}\n", clusters.len()));

    for cluster in clusters {
        let shown: Vec<&str> = cluster
            .articles
            .iter()
            .take(CONSOLE_ID_LIMIT)
            .map(String::as_str)
            .collect();

        report.push_str(&format!("\nCluster {}:\n", cluster.cluster_id));
        report.push_str(&format!("  Title: {}\n", cluster.topic_title));
        report.push_str(&format!("  Summary: {}\n", cluster.topic_summary));
        report.push_str(&format!("  Articles: {} articles\n", cluster.articles.len()));
        report.push_str(&format!("  Article IDs: {}", shown.join(", ")));
        if cluster.articles.len() > CONSOLE_ID_LIMIT {
            report.push_str(&format!(
                "... and {} more",
                cluster.articles.len() - CONSOLE_ID_LIMIT
            ));
        }
        report.push('\n');
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use news_clustering::ClusteringConfig;
    use news_embeddings::{EmbeddingModel, KeywordEmbedder, LazyEmbedder};
    use news_summarizer::{MockSummarizer, Summarizer};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn service(summarizer: Arc<dyn Summarizer>) -> NewsClusteringService {
        let embedder = LazyEmbedder::ready(Arc::new(KeywordEmbedder::new([
            vec!["경제", "금리", "주식"],
            vec!["축구", "경기", "골"],
        ])) as Arc<dyn EmbeddingModel>);
        NewsClusteringService::new(embedder, summarizer, ClusteringConfig::default(), 2).unwrap()
    }

    fn batch() -> ArticleBatch {
        ArticleBatch::parse(
            r#"[
                {"id": "n1", "content": "경제 성장률 발표, 주식 시장 반등"},
                {"id": "n2", "content": "축구 대표팀 경기에서 골 폭발"},
                {"id": "n3", "content": "금리 인하 기대에 경제 회복, 주식 상승"},
                {"id": "n4", "content": "축구 리그 개막"},
                {"id": "n5", "content": "주식 거래량 증가"},
                {"id": "n6", "content": "결승 경기 연장전 끝에 골"}
            ]"#,
        )
        .unwrap()
    }

    fn cluster(id: i64, members: usize) -> ArticleCluster {
        ArticleCluster {
            cluster_id: id,
            articles: (1..=members).map(|i| format!("a{i}")).collect(),
            topic_title: "제목".to_string(),
            topic_summary: "요약".to_string(),
        }
    }

    #[test]
    fn test_console_report_truncates_ids() {
        let report = format_console_report(&[cluster(0, 7), cluster(1, 2)]);
        let expected = "\nClustering Results:\n\
                        Total clusters found: 2\n\
                        \nCluster 0:\n  Title: 제목\n  Summary: 요약\n  Articles: 7 articles\n  \
                        Article IDs: a1, a2, a3, a4, a5... and 2 more\n\
                        \nCluster 1:\n  Title: 제목\n  Summary: 요약\n  Articles: 2 articles\n  \
                        Article IDs: a1, a2\n";
        assert_eq!(report, expected);
    }

    #[test]
    fn test_console_report_exactly_five_ids() {
        let report = format_console_report(&[cluster(3, 5)]);
        assert!(report.contains("Article IDs: a1, a2, a3, a4, a5\n"));
        assert!(!report.contains("more"));
    }

    #[test]
    fn test_read_batch_skips_malformed_items() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("news.json");
        fs::write(
            &path,
            r#"[{"id": "1", "content": "ok"}, {"id": "2"}, "junk"]"#,
        )
        .unwrap();

        let batch = read_batch(&path).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.articles[0].id, "1");
    }

    #[test]
    fn test_read_batch_rejects_other_shapes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("news.json");
        fs::write(&path, r#"{"items": []}"#).unwrap();
        assert!(read_batch(&path).is_err());
    }

    #[tokio::test]
    async fn test_process_missing_input_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        let err = process_file(None, &missing, None, false, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Input file not found"));
    }

    /// Settings that can never produce a service.
    fn unbuildable_settings() -> Settings {
        let mut settings = Settings::default();
        settings.summarizer.api_key = Some("sk-unused".to_string());
        settings.summarizer.concurrency = 0;
        settings
    }

    #[tokio::test]
    async fn test_process_empty_file_skips_service() {
        let dir = TempDir::new().unwrap();
        let settings = unbuildable_settings();

        for (name, contents) in [
            ("empty.json", "[]"),
            ("incomplete.json", r#"[{"id": "x"}]"#),
            ("empty_request.json", r#"{"articles": []}"#),
        ] {
            let path = dir.path().join(name);
            fs::write(&path, contents).unwrap();

            let mut out = Vec::new();
            process_input(&settings, &path, None, false, &mut out)
                .await
                .unwrap();
            assert_eq!(
                String::from_utf8(out).unwrap(),
                format!("{}\n", NO_ARTICLES_MESSAGE),
                "{name}"
            );
        }
    }

    #[tokio::test]
    async fn test_process_non_empty_file_builds_service() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("news.json");
        fs::write(&path, r#"[{"id": "1", "content": "경제 뉴스"}]"#).unwrap();

        let mut out = Vec::new();
        let err = process_input(&unbuildable_settings(), &path, None, false, &mut out)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to build clustering service"));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_run_batch_writes_report() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("result.json");
        let mut out = Vec::new();

        let report = run_batch(
            &service(Arc::new(MockSummarizer::with_title_prefix("주제"))),
            &batch(),
            Some(&output),
            true,
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(report.total_articles, 6);
        assert_eq!(report.total_clusters, 2);

        let written = fs::read_to_string(&output).unwrap();
        assert!(written.contains("주제"), "non-ASCII text must not be escaped");

        let parsed: BatchReport = serde_json::from_str(&written).unwrap();
        let mut groups: Vec<Vec<String>> =
            parsed.clusters.iter().map(|c| c.articles.clone()).collect();
        groups.sort();
        assert_eq!(
            groups,
            vec![
                vec!["n1".to_string(), "n3".to_string(), "n5".to_string()],
                vec!["n2".to_string(), "n4".to_string(), "n6".to_string()],
            ]
        );
        assert!(parsed.clusters.iter().all(|c| c.article_count == 3));

        let console = String::from_utf8(out).unwrap();
        assert!(console.starts_with("Processing 6 articles...\n"));
        assert!(console.contains("Results saved to:"));
        assert!(console.contains("Output file contents:"));
    }

    #[tokio::test]
    async fn test_run_batch_prints_console_report() {
        let mut out = Vec::new();
        run_batch(
            &service(Arc::new(MockSummarizer::new())),
            &batch(),
            None,
            false,
            &mut out,
        )
        .await
        .unwrap();

        let console = String::from_utf8(out).unwrap();
        assert!(console.contains("Total clusters found: 2"));
        assert!(console.contains("  Articles: 3 articles"));
    }

    #[tokio::test]
    async fn test_run_batch_reports_errors() {
        let mut out = Vec::new();
        let result = run_batch(
            &service(Arc::new(MockSummarizer::failing())),
            &batch(),
            None,
            false,
            &mut out,
        )
        .await;

        assert!(result.is_err());
        let console = String::from_utf8(out).unwrap();
        assert!(console.contains("Error processing articles:"));
    }
}
