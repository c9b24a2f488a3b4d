use super::html::parse_html;
use super::{FetchOutcome, PageSource};
use crate::domain::error::DomainError;
use crate::domain::ports::crawl_engine::Page;
use crate::domain::values::crawl_config::CrawlConfig;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches pages over HTTP(S) with reqwest.
pub struct HttpPageSource {
    client: reqwest::Client,
    include_binary_content: bool,
    max_download_size: usize,
}

impl HttpPageSource {
    pub fn new(config: &CrawlConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DomainError::Config(format!("http client: {e}")))?;
        Ok(Self {
            client,
            include_binary_content: config.include_binary_content,
            max_download_size: config.max_download_size,
        })
    }

    fn too_large(&self, len: usize) -> Option<FetchOutcome> {
        (len > self.max_download_size).then(|| self.oversized(len))
    }

    fn oversized(&self, len: usize) -> FetchOutcome {
        FetchOutcome::Skipped(format!(
            "body of {len} bytes exceeds limit of {}",
            self.max_download_size
        ))
    }
}

/// Response body collected chunk by chunk up to a byte limit.
struct BodyBuffer {
    limit: usize,
    bytes: Vec<u8>,
}

impl BodyBuffer {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            bytes: Vec::new(),
        }
    }

    /// Appends a chunk. Returns the would-be length instead once the limit is
    /// passed; the chunk is then dropped and the buffer stays at or below it.
    fn push(&mut self, chunk: &[u8]) -> Result<(), usize> {
        let len = self.bytes.len() + chunk.len();
        if len > self.limit {
            return Err(len);
        }
        self.bytes.extend_from_slice(chunk);
        Ok(())
    }
}

fn is_html(content_type: Option<&str>) -> bool {
    content_type.map_or(true, |ct| ct.to_ascii_lowercase().contains("html"))
}

fn is_text(content_type: Option<&str>) -> bool {
    content_type.map_or(true, |ct| {
        let ct = ct.to_ascii_lowercase();
        ct.starts_with("text/") || ct.contains("html") || ct.contains("xml") || ct.contains("json")
    })
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str, depth: u32) -> Result<FetchOutcome, DomainError> {
        let mut resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::Fetch(format!("{url}: {e}")))?;

        if !resp.status().is_success() {
            return Err(DomainError::Fetch(format!("{url} returned {}", resp.status())));
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !self.include_binary_content && !is_text(content_type.as_deref()) {
            return Ok(FetchOutcome::Skipped(format!(
                "binary content {}",
                content_type.unwrap_or_default()
            )));
        }
        if let Some(skip) = resp.content_length().and_then(|len| self.too_large(len as usize)) {
            return Ok(skip);
        }

        let final_url = resp.url().to_string();
        let mut body = BodyBuffer::new(self.max_download_size);
        while let Some(chunk) = resp
            .chunk()
            .await
            .map_err(|e| DomainError::Fetch(format!("{url}: {e}")))?
        {
            if let Err(len) = body.push(&chunk) {
                tracing::debug!(url = %url, read = len, "download limit reached, dropping body");
                return Ok(self.oversized(len));
            }
        }

        if !is_html(content_type.as_deref()) {
            return Ok(FetchOutcome::Page(Page {
                url: url.to_string(),
                depth,
                content_type,
                ..Page::default()
            }));
        }

        let parsed = parse_html(&final_url, &String::from_utf8_lossy(&body.bytes));
        Ok(FetchOutcome::Page(Page {
            url: url.to_string(),
            depth,
            title: parsed.title,
            text: Some(parsed.text),
            outgoing_links: parsed.links,
            content_type,
        }))
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_classes() {
        assert!(is_html(Some("text/html; charset=utf-8")));
        assert!(is_html(None));
        assert!(!is_html(Some("application/pdf")));
        assert!(is_text(Some("text/plain")));
        assert!(is_text(Some("application/xhtml+xml")));
        assert!(!is_text(Some("image/png")));
    }

    #[test]
    fn test_size_limit() {
        let config = CrawlConfig {
            max_download_size: 10,
            ..Default::default()
        };
        let source = HttpPageSource::new(&config).unwrap();
        assert!(source.too_large(10).is_none());
        assert!(matches!(source.too_large(11), Some(FetchOutcome::Skipped(_))));
    }

    #[test]
    fn test_body_stops_at_limit() {
        let mut body = BodyBuffer::new(10);
        assert_eq!(body.push(b"<p>abc"), Ok(()));
        assert_eq!(body.push(b"def"), Ok(()));
        assert_eq!(body.push(b"ghij</p>"), Err(17));
        assert_eq!(body.bytes, b"<p>abcdef");
        assert_eq!(body.push(b"g"), Ok(()));
        assert_eq!(body.bytes.len(), 10);
        assert_eq!(body.push(b"!"), Err(11));
    }
}
