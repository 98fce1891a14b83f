//! Prompt construction and response parsing.
//!
//! The model is asked for two labelled lines:
//!
//! ```text
//! 제목: <title, at most 15 characters>
//! 요약: <summary, at most 50 characters>
//! ```

use crate::ClusterSummary;

/// System message sent with every request.
pub const SYSTEM_PROMPT: &str = "당신은 뉴스 기사를 요약하는 전문가입니다.";

const TITLE_PREFIXES: &[&str] = &["제목:", "제목：", "Title:"];
const SUMMARY_PREFIXES: &[&str] = &["요약:", "요약：", "Summary:"];

/// Build the user prompt from the first `max_articles` texts.
pub fn build_prompt(articles: &[String], max_articles: usize) -> String {
    let articles_text = articles
        .iter()
        .take(max_articles.max(1))
        .enumerate()
        .map(|(i, article)| format!("기사 {}:\n{}", i + 1, article))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "다음 뉴스 기사들을 바탕으로 공통 주제를 파악하고, 간결한 제목과 요약을 만들어주세요.

{articles_text}

출력 형식:
제목: [15자 이내의 간결한 제목]
요약: [50자 이내로 이 기사들의 공통 주제와 핵심 내용을 설명]"
    )
}

/// Extract title and summary lines, or `None` if either is missing.
pub fn try_parse_response(response: &str) -> Option<ClusterSummary> {
    let mut title = None;
    let mut summary = None;

    for line in response.lines() {
        let line = line.replace("**", "");
        let line = line.trim();

        if let Some(rest) = strip_any_prefix(line, TITLE_PREFIXES) {
            title = Some(rest.to_string());
        } else if let Some(rest) = strip_any_prefix(line, SUMMARY_PREFIXES) {
            summary = Some(rest.to_string());
        }
    }

    match (title, summary) {
        (Some(title), Some(summary)) if !title.is_empty() && !summary.is_empty() => {
            Some(ClusterSummary { title, summary })
        }
        _ => None,
    }
}

/// Parse a model response, falling back to the generic pair.
pub fn parse_response(response: &str) -> ClusterSummary {
    try_parse_response(response).unwrap_or_else(ClusterSummary::fallback)
}

fn strip_any_prefix<'a>(line: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes.iter().find_map(|prefix| {
        let head = line.get(..prefix.len())?;
        if head.eq_ignore_ascii_case(prefix) {
            line.get(prefix.len()..).map(str::trim)
        } else {
            None
        }
    })
}
