use anyhow::{Context, anyhow};
use async_trait::async_trait;
use newsdesk::{Crawler, DeskError, SearchResultItem};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<]+?>").expect("valid tag pattern"));

const BREAKING_NEWS: &[&str] = &["단독", "속보", "긴급", "특종", "최초공개", "1보"];
const TRENDING: &[&str] = &["화제", "논란", "충격", "파격", "돌발", "이슈"];
const VIRAL: &[&str] = &["실시간", "핫이슈", "급상승", "화제성", "관심집중"];
const SIGNIFICANT: &[&str] = &["중대발표", "특별", "공식", "전격", "전원", "중요"];
const HOT_TOPIC_THRESHOLD: f64 = 1.5;

const NEWS_HOT_TAGS: [&str; 2] = ["#핫토픽", "#핫이슈"];
const BLOG_HOT_TAGS: [&str; 2] = ["#핫토픽", "#트렌드"];
const MAX_RELATED_KEYWORDS: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    title: String,
    link: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "errorCode")]
    error_code: String,
    #[serde(rename = "errorMessage", default)]
    error_message: String,
}

/// Crawler backed by the Naver search open API
#[derive(Clone)]
pub struct NaverCrawler {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    api_base: String,
    suggest_url: String,
}

impl NaverCrawler {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        api_base: impl Into<String>,
        suggest_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            suggest_url: suggest_url.into(),
        }
    }

    async fn search(
        &self,
        endpoint: &str,
        keyword: &str,
        count: u32,
        hot_tags: [&str; 2],
    ) -> anyhow::Result<Vec<SearchResultItem>> {
        let url = format!("{}/{}", self.api_base, endpoint);
        let display_count = (count * 2).to_string();
        debug!(url = %url, keyword, display = %display_count, "Naver search request");

        let response = self
            .client
            .get(&url)
            .header("X-Naver-Client-Id", &self.client_id)
            .header("X-Naver-Client-Secret", &self.client_secret)
            .query(&[
                ("query", keyword),
                ("display", display_count.as_str()),
                ("sort", "date"),
            ])
            .send()
            .await
            .with_context(|| format!("Naver {} request failed", endpoint))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read Naver response body")?;

        if let Ok(error) = serde_json::from_str::<ErrorBody>(&body) {
            return Err(provider_error(&error));
        }
        if !status.is_success() {
            return Err(anyhow!("Naver API returned {}: {}", status, body));
        }

        let data: SearchResponse =
            serde_json::from_str(&body).context("Invalid Naver search response")?;
        info!(
            endpoint,
            total = data.total,
            received = data.items.len(),
            "Naver search results received"
        );

        let items = relevant_items(data.items, keyword, count as usize, hot_tags);
        info!(endpoint, selected = items.len(), "Naver search results filtered");
        Ok(items)
    }

    async fn suggestions(&self, keyword: &str) -> anyhow::Result<Vec<String>> {
        let response = self
            .client
            .get(&self.suggest_url)
            .query(&[
                ("q", keyword),
                ("q_enc", "UTF-8"),
                ("st", "100"),
                ("frm", "nv"),
                ("r_format", "json"),
                ("r_enc", "UTF-8"),
                ("r_unicode", "0"),
                ("t_koreng", "1"),
                ("ans", "2"),
            ])
            .send()
            .await
            .context("Naver suggestion request failed")?
            .error_for_status()
            .context("Naver suggestion request rejected")?;

        let data: Value = response
            .json()
            .await
            .context("Invalid Naver suggestion response")?;

        Ok(parse_suggestions(&data))
    }
}

fn provider_error(error: &ErrorBody) -> anyhow::Error {
    match error.error_code.as_str() {
        "024" | "025" => anyhow!("Naver API key error: {}", error.error_message),
        code => anyhow!("Naver API error {}: {}", code, error.error_message),
    }
}

fn strip_tags(text: &str) -> String {
    TAG_PATTERN.replace_all(text, "").into_owned()
}

fn relevant_items(
    raw: Vec<RawItem>,
    keyword: &str,
    count: usize,
    hot_tags: [&str; 2],
) -> Vec<SearchResultItem> {
    let needle = keyword.to_lowercase();
    raw.into_iter()
        .map(|item| (strip_tags(&item.title), strip_tags(&item.description), item.link))
        .filter(|(title, description, _)| {
            title.to_lowercase().contains(&needle) || description.to_lowercase().contains(&needle)
        })
        .take(count)
        .map(|(title, description, link)| {
            let tags = if is_hot_topic(&title, &description) {
                hot_tags.iter().map(|t| t.to_string()).collect()
            } else {
                Vec::new()
            };
            SearchResultItem {
                title,
                link,
                description,
                tags,
            }
        })
        .collect()
}

/// Score breaking/trending/viral/significant markers and flag the item when
/// the score reaches the threshold.
pub fn is_hot_topic(title: &str, description: &str) -> bool {
    let text = format!("{} {}", title, description).to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| text.contains(w));

    let mut score = 0.0;
    if mentions(BREAKING_NEWS) {
        score += 2.0;
    }
    if mentions(TRENDING) {
        score += 1.5;
    }
    if mentions(VIRAL) {
        score += 1.3;
    }
    if mentions(SIGNIFICANT) {
        score += 1.2;
    }
    if title.contains('!') || title.contains('?') {
        score += 0.3;
    }
    if title.contains("[단독]") || title.contains("[속보]") {
        score += 0.5;
    }

    score >= HOT_TOPIC_THRESHOLD
}

fn parse_suggestions(data: &Value) -> Vec<String> {
    data["items"]
        .get(0)
        .and_then(Value::as_array)
        .map(|group| {
            group
                .iter()
                .filter_map(|entry| entry.get(0).and_then(Value::as_str))
                .take(MAX_RELATED_KEYWORDS)
                .map(|keyword| format!("#{}", keyword))
                .collect()
        })
        .unwrap_or_default()
}

fn crawler_error(e: anyhow::Error) -> DeskError {
    warn!("Naver crawler error: {:#}", e);
    DeskError::Crawler(format!("{:#}", e))
}

#[async_trait]
impl Crawler for NaverCrawler {
    async fn retrieve_news(
        &self,
        keyword: &str,
        count: u32,
    ) -> newsdesk::Result<Vec<SearchResultItem>> {
        self.search("news.json", keyword, count, NEWS_HOT_TAGS)
            .await
            .map_err(crawler_error)
    }

    async fn retrieve_blog_posts(
        &self,
        keyword: &str,
        count: u32,
    ) -> newsdesk::Result<Vec<SearchResultItem>> {
        self.search("blog.json", keyword, count, BLOG_HOT_TAGS)
            .await
            .map_err(crawler_error)
    }

    async fn retrieve_related_keywords(&self, keyword: &str) -> newsdesk::Result<Vec<String>> {
        self.suggestions(keyword).await.map_err(crawler_error)
    }
}
