//! A fixed set of pages served from memory. Used for dry runs and tests
//! where the crawl must not touch the network.

use super::html::parse_html;
use super::{FetchOutcome, PageSource};
use crate::domain::error::DomainError;
use crate::domain::ports::crawl_engine::Page;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct StoredPage {
    content_type: String,
    body: String,
}

#[derive(Debug, Default)]
pub struct InMemoryWeb {
    pages: HashMap<String, StoredPage>,
    fetched: Mutex<Vec<String>>,
}

impl InMemoryWeb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_html(self, url: &str, html: &str) -> Self {
        self.with_resource(url, "text/html", html)
    }

    pub fn with_resource(mut self, url: &str, content_type: &str, body: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            StoredPage {
                content_type: content_type.to_string(),
                body: body.to_string(),
            },
        );
        self
    }

    /// URLs fetched so far, in fetch order. Unknown URLs are included.
    pub fn fetched(&self) -> Vec<String> {
        match self.fetched.lock() {
            Ok(log) => log.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn log(&self, url: &str) {
        let mut log = match self.fetched.lock() {
            Ok(log) => log,
            Err(poisoned) => poisoned.into_inner(),
        };
        log.push(url.to_string());
    }
}

#[async_trait]
impl PageSource for InMemoryWeb {
    async fn fetch(&self, url: &str, depth: u32) -> Result<FetchOutcome, DomainError> {
        self.log(url);
        let stored = self
            .pages
            .get(url)
            .ok_or_else(|| DomainError::Fetch(format!("{url} returned 404 Not Found")))?;

        if !stored.content_type.contains("html") {
            return Ok(FetchOutcome::Page(Page {
                url: url.to_string(),
                depth,
                content_type: Some(stored.content_type.clone()),
                ..Page::default()
            }));
        }

        let parsed = parse_html(url, &stored.body);
        Ok(FetchOutcome::Page(Page {
            url: url.to_string(),
            depth,
            title: parsed.title,
            text: Some(parsed.text),
            outgoing_links: parsed.links,
            content_type: Some(stored.content_type.clone()),
        }))
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_parsed_html() {
        let web = InMemoryWeb::new().with_html(
            "http://news.example/",
            r#"<html><head><title>Front</title></head><body>hi <a href="/a">a</a></body></html>"#,
        );
        let Ok(FetchOutcome::Page(page)) = web.fetch("http://news.example/", 0).await else {
            panic!("expected a page");
        };
        assert_eq!(page.title.as_deref(), Some("Front"));
        assert_eq!(page.outgoing_links, vec!["http://news.example/a".to_string()]);
        assert_eq!(web.fetched(), vec!["http://news.example/".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_url_is_fetch_error() {
        let web = InMemoryWeb::new();
        let result = web.fetch("http://nowhere.example/", 0).await;
        assert!(matches!(result, Err(DomainError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_non_html_has_no_text() {
        let web = InMemoryWeb::new().with_resource("http://x.example/r.txt", "text/plain", "ACME up");
        let Ok(FetchOutcome::Page(page)) = web.fetch("http://x.example/r.txt", 1).await else {
            panic!("expected a page");
        };
        assert!(page.text.is_none());
        assert_eq!(page.depth, 1);
    }
}
