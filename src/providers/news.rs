use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::core::config::ApiConfig;
use crate::core::news::{NewsArticle, NewsSource};

pub struct NewsProvider {
    base_url: String,
    client: reqwest::Client,
}

impl NewsProvider {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("X-BingApis-SDK", HeaderValue::from_static("true"));
        if let Some(host) = &config.api_host {
            headers.insert("X-RapidAPI-Host", HeaderValue::from_str(host)?);
        }
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            headers.insert("X-RapidAPI-Key", HeaderValue::from_str(key)?);
        }
        let client = reqwest::Client::builder()
            .user_agent("coinboard/0.1")
            .default_headers(headers)
            .build()?;
        Ok(NewsProvider {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

/// The news endpoint has answered with two different schemas over time.
/// Which one arrived is decided here, once.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum NewsResponse {
    Articles { data: Vec<ApiArticle> },
    Bing { value: Vec<BingArticle> },
    Unrecognized(serde_json::Value),
}

#[derive(Deserialize, Debug)]
struct ApiArticle {
    title: Option<String>,
    url: Option<String>,
    excerpt: Option<String>,
    thumbnail: Option<String>,
    source: Option<String>,
    published_at: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Thumbnail {
    #[serde(rename = "contentUrl")]
    content_url: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Image {
    thumbnail: Option<Thumbnail>,
}

#[derive(Deserialize, Debug)]
struct BingProvider {
    name: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct BingArticle {
    name: Option<String>,
    url: Option<String>,
    description: Option<String>,
    image: Option<Image>,
    #[serde(default)]
    provider: Vec<BingProvider>,
    date_published: Option<String>,
}

impl ApiArticle {
    /// `None` when the self lacks a title or link.
    fn into_article(self) -> Option<NewsArticle> {
        Some(NewsArticle {
            title: self.title?,
            url: self.url?,
            description: self.excerpt.unwrap_or_default(),
            provider: self.source.unwrap_or_else(|| "Unknown".to_string()),
            thumbnail_url: self.thumbnail,
            published_at: self.published_at,
        })
    }
}

impl BingArticle {
    fn into_article(self) -> Option<NewsArticle> {
        Some(NewsArticle {
            title: self.name?,
            url: self.url?,
            description: self.description.unwrap_or_default(),
            provider: self
                .provider
                .into_iter()
                .find_map(|p| p.name)
                .unwrap_or_else(|| "Unknown".to_string()),
            thumbnail_url: self
                .image
                .and_then(|i| i.thumbnail)
                .and_then(|t| t.content_url),
            published_at: self.date_published,
        })
    }
}

fn keep_complete(articles: impl Iterator<Item = Option<NewsArticle>>) -> Vec<NewsArticle> {
    let mut skipped = 0;
    let complete: Vec<NewsArticle> = articles
        .filter_map(|a| {
            if a.is_none() {
                skipped += 1;
            }
            a
        })
        .collect();
    if skipped > 0 {
        warn!(skipped, "Skipped news articles without a title or url");
    }
    complete
}

#[async_trait]
impl NewsSource for NewsProvider {
    #[instrument(name = "NewsFetch", skip(self))]
    async fn fetch_news(&self, query: &str, count: usize) -> Result<Vec<NewsArticle>> {
        let count = count.to_string();
        let url = reqwest::Url::parse_with_params(
            &format!("{}/news/search", self.base_url),
            &[
                ("q", query),
                ("safeSearch", "Off"),
                ("textFormat", "Raw"),
                ("freshness", "Day"),
                ("count", count.as_str()),
            ],
        )?;
        debug!("Requesting news from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for news query: {}", e, query))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for news query: {}",
                response.status(),
                query
            ));
        }

        let text = response.text().await?;
        let data: NewsResponse = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON response for news query: {query}"))?;

        match data {
            NewsResponse::Articles { data } => {
                Ok(keep_complete(data.into_iter().map(ApiArticle::into_article)))
            }
            NewsResponse::Bing { value } => {
                Ok(keep_complete(value.into_iter().map(BingArticle::into_article)))
            }
            NewsResponse::Unrecognized(body) => {
                debug!(%body, "Unrecognized news response");
                Err(anyhow!("Unrecognized news response for news query: {}", query))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(query: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news/search"))
            .and(query_param("q", query))
            .and(query_param("freshness", "Day"))
            .and(header("X-BingApis-SDK", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn provider(server: &MockServer) -> NewsProvider {
        NewsProvider::new(&ApiConfig {
            base_url: server.uri(),
            api_host: None,
            api_key: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_news_api_schema() {
        let mock_response = r#"{
            "success": true,
            "data": [{
                "title": "Bitcoin rallies",
                "url": "https://news.example.com/1",
                "excerpt": "Prices went up",
                "thumbnail": "https://img.example.com/1.png",
                "source": "Example News",
                "published_at": "2024-03-01T10:00:00Z"
            }],
            "totalHits": 1
        }"#;
        let mock_server = create_mock_server("Cryptocurrency", mock_response).await;

        let articles = provider(&mock_server)
            .fetch_news("Cryptocurrency", 6)
            .await
            .unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Bitcoin rallies");
        assert_eq!(articles[0].description, "Prices went up");
        assert_eq!(articles[0].provider, "Example News");
        assert_eq!(
            articles[0].thumbnail_url.as_deref(),
            Some("https://img.example.com/1.png")
        );
    }

    #[tokio::test]
    async fn test_bing_schema() {
        let mock_response = r#"{
            "_type": "News",
            "value": [{
                "name": "Ethereum upgrade ships",
                "url": "https://news.example.com/2",
                "description": "The upgrade is live",
                "image": {"thumbnail": {"contentUrl": "https://img.example.com/2.png", "width": 700}},
                "provider": [{"_type": "Organization", "name": "Bing Source"}],
                "datePublished": "2024-03-02T08:00:00.0000000Z"
            }, {
                "name": "Bare article",
                "url": "https://news.example.com/3"
            }]
        }"#;
        let mock_server = create_mock_server("Ethereum", mock_response).await;

        let articles = provider(&mock_server).fetch_news("Ethereum", 12).await.unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Ethereum upgrade ships");
        assert_eq!(articles[0].provider, "Bing Source");
        assert_eq!(
            articles[0].thumbnail_url.as_deref(),
            Some("https://img.example.com/2.png")
        );
        assert_eq!(
            articles[0].published_at.as_deref(),
            Some("2024-03-02T08:00:00.0000000Z")
        );
        assert_eq!(articles[1].provider, "Unknown");
        assert!(articles[1].description.is_empty());
        assert!(articles[1].thumbnail_url.is_none());
    }

    #[tokio::test]
    async fn test_empty_article_list() {
        let mock_server =
            create_mock_server("Dogecoin", r#"{"success": true, "data": []}"#).await;

        let articles = provider(&mock_server).fetch_news("Dogecoin", 6).await.unwrap();
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn test_unrecognized_response_is_an_error() {
        let mock_server = create_mock_server("Dogecoin", r#"{"success": false}"#).await;

        let result = provider(&mock_server).fetch_news("Dogecoin", 6).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "Unrecognized news response for news query: Dogecoin"
        );
    }

    #[tokio::test]
    async fn test_incomplete_articles_are_skipped() {
        let mock_response = r#"{
            "data": [
                {"title": "Good", "url": "https://news.example.com/good", "excerpt": "kept"},
                {"title": "No url here", "excerpt": "dropped"}
            ]
        }"#;
        let mock_server = create_mock_server("Solana", mock_response).await;

        let articles = provider(&mock_server).fetch_news("Solana", 6).await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Good");

        let mock_response = r#"{
            "value": [
                {"url": "https://news.example.com/nameless"},
                {"name": "Named", "url": "https://news.example.com/named"}
            ]
        }"#;
        let mock_server = create_mock_server("Cardano", mock_response).await;

        let articles = provider(&mock_server).fetch_news("Cardano", 6).await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].url, "https://news.example.com/named");
    }

    #[tokio::test]
    async fn test_news_api_error_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news/search"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let result = provider(&mock_server).fetch_news("Bitcoin", 6).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 503 Service Unavailable for news query: Bitcoin"
        );
    }
}
