use serde::Serialize;
use tracing::{error, info};

use crate::{
    collaborators::CollaboratorFactory,
    error::{DeskError, Result},
    session::SessionState,
};

/// Progress checkpoints shown while a search runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStage {
    News,
    Blogs,
    Related,
    Done,
}

impl SearchStage {
    pub fn percent(&self) -> u8 {
        match self {
            SearchStage::News => 20,
            SearchStage::Blogs => 50,
            SearchStage::Related => 80,
            SearchStage::Done => 100,
        }
    }

    pub fn status_text(&self) -> &'static str {
        match self {
            SearchStage::News => "Searching news...",
            SearchStage::Blogs => "Searching blogs...",
            SearchStage::Related => "Looking up related keywords...",
            SearchStage::Done => "",
        }
    }
}

/// Receives progress updates during a search
pub trait ProgressSink: Send {
    fn advance(&mut self, stage: SearchStage);
}

impl ProgressSink for Vec<SearchStage> {
    fn advance(&mut self, stage: SearchStage) {
        self.push(stage);
    }
}

/// Outcome banner of a completed search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SearchSummary {
    Found { total: usize },
    Empty,
}

impl SearchSummary {
    pub fn message(&self) -> String {
        match self {
            SearchSummary::Found { total } => {
                format!("Search complete ({} results in total)", total)
            }
            SearchSummary::Empty => "No results found".to_string(),
        }
    }
}

/// Run the news → blog → related-keyword sequence for `keyword` and commit
/// all three lists to the session once every call has succeeded.
pub async fn run_search(
    session: &mut SessionState,
    factory: &dyn CollaboratorFactory,
    keyword: &str,
    progress: &mut dyn ProgressSink,
) -> Result<SearchSummary> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(DeskError::Validation("Please enter a keyword!".to_string()));
    }

    let crawler = match &session.crawler {
        Some(crawler) => crawler.clone(),
        None => {
            let crawler = factory.crawler()?;
            session.crawler = Some(crawler.clone());
            crawler
        }
    };

    let news_count = session.settings.news_count;
    let blog_count = session.settings.blog_count;
    info!(
        session_id = %session.id,
        keyword = %keyword,
        news_count,
        blog_count,
        "Starting search"
    );

    progress.advance(SearchStage::News);
    let news = crawler
        .retrieve_news(keyword, news_count)
        .await
        .inspect_err(|e| error!("News retrieval failed: {}", e))?;

    progress.advance(SearchStage::Blogs);
    let blog = crawler
        .retrieve_blog_posts(keyword, blog_count)
        .await
        .inspect_err(|e| error!("Blog retrieval failed: {}", e))?;

    progress.advance(SearchStage::Related);
    let related = crawler
        .retrieve_related_keywords(keyword)
        .await
        .inspect_err(|e| error!("Related keyword lookup failed: {}", e))?;

    progress.advance(SearchStage::Done);

    let total = news.len() + blog.len();
    session.news_results = Some(news);
    session.blog_results = Some(blog);
    session.related_keywords = Some(related);
    session.generation += 1;

    info!(session_id = %session.id, total, "Search committed");

    Ok(if total == 0 {
        SearchSummary::Empty
    } else {
        SearchSummary::Found { total }
    })
}
