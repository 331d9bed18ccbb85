use crate::{
    error::{DeskError, Result},
    models::{ContentItem, Origin, SearchResultItem},
    session::SessionState,
};

/// All selectable items: news first, then blog posts, each in retrieval order.
pub fn combined_contents(session: &SessionState) -> Vec<ContentItem> {
    let news = tag(session.generation, Origin::News, session.news_results.as_deref());
    let blog = tag(session.generation, Origin::Blog, session.blog_results.as_deref());
    news.chain(blog).collect()
}

fn tag(
    generation: u64,
    origin: Origin,
    items: Option<&[SearchResultItem]>,
) -> impl Iterator<Item = ContentItem> + '_ {
    items
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(move |(index, item)| ContentItem {
            id: format!("{}:{}:{}", generation, origin, index),
            origin,
            item: item.clone(),
        })
}

/// Look up the selected item by identifier.
pub fn resolve(session: &SessionState, content_id: &str) -> Result<ContentItem> {
    combined_contents(session)
        .into_iter()
        .find(|content| content.id == content_id)
        .ok_or_else(|| DeskError::ContentNotFound(content_id.to_string()))
}
