//! Batch file E2E tests: JSON file in, report file out.

use std::fs;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use e2e_tests::{outlier_article, topic_articles, TestHarness, POLITICS, SPORTS};
use news_daemon::{read_batch, run_batch};
use news_summarizer::MockSummarizer;
use news_types::{Article, BatchReport};

fn articles_json(articles: &[Article]) -> Value {
    serde_json::to_value(articles).unwrap()
}

fn sample_articles() -> Vec<Article> {
    let mut articles = topic_articles("p", &POLITICS, 3);
    articles.extend(topic_articles("s", &SPORTS, 3));
    articles.push(outlier_article("x1"));
    articles
}

#[tokio::test]
async fn test_batch_from_bare_array_writes_report() {
    let harness = TestHarness::with_summarizer(Arc::new(MockSummarizer::with_title_prefix("주제")));
    let input = harness.write_file(
        "news.json",
        &articles_json(&sample_articles()).to_string(),
    );
    let output = harness.path("result.json");

    let batch = read_batch(&input).unwrap();
    assert_eq!(batch.len(), 7);

    let mut console = Vec::new();
    let report = run_batch(&harness.service, &batch, Some(&output), false, &mut console)
        .await
        .unwrap();

    assert_eq!(report.total_articles, 7);
    assert_eq!(report.total_clusters, 3);

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("\"주제: "), "Korean titles must be written unescaped");

    let parsed: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed["total_articles"], 7);
    assert_eq!(parsed["total_clusters"], 3);

    let counts: Vec<u64> = parsed["clusters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["article_count"].as_u64().unwrap())
        .collect();
    assert_eq!(counts, vec![3, 3, 1]);

    let console = String::from_utf8(console).unwrap();
    assert_eq!(
        console,
        format!(
            "Processing 7 articles...\nResults saved to: {}\n",
            output.display()
        )
    );
}

#[tokio::test]
async fn test_batch_from_request_layout() {
    let harness = TestHarness::new();
    let input = harness.write_file(
        "request.json",
        &json!({ "articles": articles_json(&sample_articles()) }).to_string(),
    );

    let batch = read_batch(&input).unwrap();
    assert_eq!(batch.len(), 7);

    let mut console = Vec::new();
    let report = run_batch(&harness.service, &batch, None, false, &mut console)
        .await
        .unwrap();
    assert_eq!(report.total_clusters, 3);

    let console = String::from_utf8(console).unwrap();
    assert!(console.contains("Total clusters found: 3"));
    assert!(console.contains("\nCluster 2:\n"));
    assert!(console.contains("  Article IDs: x1\n"));
}

#[tokio::test]
async fn test_batch_bare_array_skips_incomplete_items() {
    let harness = TestHarness::new();
    let input = harness.write_file(
        "partial.json",
        r#"[
            {"id": "ok", "content": "election news"},
            {"id": "no-content"},
            {"content": "no id"},
            42
        ]"#,
    );

    let batch = read_batch(&input).unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.articles[0].id, "ok");
}

#[tokio::test]
async fn test_batch_show_prints_written_file() {
    let harness = TestHarness::new();
    let input = harness.write_file(
        "news.json",
        &articles_json(&sample_articles()).to_string(),
    );
    let output = harness.path("result.json");

    let batch = read_batch(&input).unwrap();
    let mut console = Vec::new();
    run_batch(&harness.service, &batch, Some(&output), true, &mut console)
        .await
        .unwrap();

    let console = String::from_utf8(console).unwrap();
    let written = fs::read_to_string(&output).unwrap();
    assert!(console.contains("Output file contents:"));
    assert!(console.ends_with(&format!("{}\n", written)));

    let report: BatchReport = serde_json::from_str(&written).unwrap();
    assert_eq!(report.clusters.len(), 3);
}

#[test]
fn test_batch_rejects_unknown_layout() {
    let harness = TestHarness::new();
    let input = harness.write_file("bad.json", r#"{"items": []}"#);
    assert!(read_batch(&input).is_err());
}
