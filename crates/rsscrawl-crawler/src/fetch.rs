use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

/// A fetched document, status and content type are checked before the body is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub status: u16,
    /// Mime type without parameters, lowercased (`text/html`, not `text/html; charset=utf-8`)
    pub content_type: Option<String>,
    pub body: String,
}

impl Fetched {
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    pub fn has_content_type(&self, expected: &str) -> bool {
        self.content_type.as_deref() == Some(expected)
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    async fn fetch(&self, url: &str) -> Result<Fetched>;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<Fetched> {
        (**self).fetch(url).await
    }
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(user_agent)
            .gzip(true)
            .deflate(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Fetched> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|c| c.to_str().ok())
            .map(mime_essence);
        let body = resp.text().await?;

        Ok(Fetched {
            status,
            content_type,
            body,
        })
    }
}

pub(crate) fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
