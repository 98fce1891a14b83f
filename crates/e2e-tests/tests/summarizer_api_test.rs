//! Pipeline E2E tests against a mocked LLM HTTP API.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use e2e_tests::{outlier_article, topic_articles, TestHarness, POLITICS, SPORTS};
use news_summarizer::{ApiSummarizer, ApiSummarizerConfig, FallbackSummarizer};
use news_types::Article;

fn sample_articles() -> Vec<Article> {
    let mut articles = topic_articles("p", &POLITICS, 3);
    articles.extend(topic_articles("s", &SPORTS, 3));
    articles.push(outlier_article("x1"));
    articles
}

fn openai_reply(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
}

fn fast(config: ApiSummarizerConfig) -> ApiSummarizerConfig {
    ApiSummarizerConfig {
        max_retries: 1,
        initial_backoff: Duration::from_millis(1),
        timeout: Duration::from_secs(5),
        ..config
    }
}

async fn mount_topic_reply(server: &MockServer, keyword: &str, reply: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains(keyword))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply(reply)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_openai_titles_flow_into_clusters() {
    let server = MockServer::start().await;
    mount_topic_reply(&server, "election", "제목: 선거 소식\n요약: 선거 관련 기사 모음입니다.").await;
    mount_topic_reply(&server, "football", "제목: 축구 소식\n요약: 축구 경기 결과입니다.").await;
    mount_topic_reply(&server, "bakery", "제목: 지역 소식\n요약: 제과점 수상 소식입니다.").await;

    let api = ApiSummarizer::new(fast(
        ApiSummarizerConfig::openai("test-key", "gpt-3.5-turbo").with_base_url(server.uri()),
    ))
    .unwrap();
    let harness = TestHarness::with_summarizer(Arc::new(api));

    let clusters = harness
        .service
        .process_articles(&sample_articles())
        .await
        .unwrap();
    assert_eq!(clusters.len(), 3);

    for cluster in &clusters {
        let expected = if cluster.articles.contains(&"p1".to_string()) {
            ("선거 소식", "선거 관련 기사 모음입니다.")
        } else if cluster.articles.contains(&"s1".to_string()) {
            ("축구 소식", "축구 경기 결과입니다.")
        } else {
            ("지역 소식", "제과점 수상 소식입니다.")
        };
        assert_eq!(
            (cluster.topic_title.as_str(), cluster.topic_summary.as_str()),
            expected
        );
    }
}

#[tokio::test]
async fn test_anthropic_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": [{ "type": "text", "text": "제목: 뉴스 주제\n요약: 기사 요약입니다." }]
        })))
        .mount(&server)
        .await;

    let api = ApiSummarizer::new(fast(
        ApiSummarizerConfig::claude("test-key", "claude-3-haiku-20240307")
            .with_base_url(server.uri()),
    ))
    .unwrap();
    let harness = TestHarness::with_summarizer(Arc::new(api));

    let clusters = harness
        .service
        .process_articles(&sample_articles())
        .await
        .unwrap();

    assert_eq!(clusters.len(), 3);
    assert!(clusters
        .iter()
        .all(|c| c.topic_title == "뉴스 주제" && c.topic_summary == "기사 요약입니다."));
}

#[tokio::test]
async fn test_unparseable_reply_uses_fallback_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("Sorry, no summary.")))
        .mount(&server)
        .await;

    let api = ApiSummarizer::new(fast(
        ApiSummarizerConfig::openai("test-key", "gpt-3.5-turbo").with_base_url(server.uri()),
    ))
    .unwrap();
    let harness = TestHarness::with_summarizer(Arc::new(api));

    let clusters = harness
        .service
        .process_articles(&sample_articles())
        .await
        .unwrap();

    assert!(clusters
        .iter()
        .all(|c| c.topic_title == "주제 클러스터" && c.topic_summary == "관련 기사들의 모음"));
}

#[tokio::test]
async fn test_provider_outage_with_fallback_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let api = ApiSummarizer::new(fast(
        ApiSummarizerConfig::openai("test-key", "gpt-3.5-turbo").with_base_url(server.uri()),
    ))
    .unwrap();
    let harness = TestHarness::with_summarizer(Arc::new(FallbackSummarizer::new(api, true)));

    let clusters = harness
        .service
        .process_articles(&sample_articles())
        .await
        .unwrap();

    assert_eq!(clusters.len(), 3);
    assert!(clusters.iter().all(|c| c.topic_title == "주제 클러스터"));
}

#[tokio::test]
async fn test_provider_outage_without_fallback_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let api = ApiSummarizer::new(fast(
        ApiSummarizerConfig::openai("test-key", "gpt-3.5-turbo").with_base_url(server.uri()),
    ))
    .unwrap();
    let harness = TestHarness::with_summarizer(Arc::new(FallbackSummarizer::new(api, false)));

    let err = harness
        .service
        .process_articles(&sample_articles())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("503"));
}
