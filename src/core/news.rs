use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
    pub description: String,
    pub provider: String,
    pub thumbnail_url: Option<String>,
    pub published_at: Option<String>,
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch_news(&self, query: &str, count: usize) -> Result<Vec<NewsArticle>>;
}
