//! Visit/skip decision for links discovered during a crawl.

use crate::domain::services::entity_matcher::EntityMatcher;
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// Suffixes of resources that never carry readable article text.
pub const BLACKLISTED_EXTENSIONS: &[&str] = &[
    // image
    "mng", "pct", "bmp", "gif", "jpg", "jpeg", "png", "pst", "psp", "tif", "tiff", "ai", "drw",
    "dxf", "eps", "ps", "svg",
    // video
    "3gp", "asf", "asx", "avi", "mov", "mp4", "mpg", "qt", "rm", "swf", "wmv", "m4a",
    // audio
    "mp3", "wma", "ogg", "wav", "ra", "aac", "mid", "au", "aiff",
    // documents, archives, scripts
    "css", "js", "pdf", "doc", "exe", "bin", "rss", "zip", "rar",
];

fn extension_filter() -> &'static Regex {
    static FILTER: OnceLock<Regex> = OnceLock::new();
    FILTER.get_or_init(|| {
        let pattern = format!(r"(?i)\.({})$", BLACKLISTED_EXTENSIONS.join("|"));
        Regex::new(&pattern).expect("extension blacklist is a valid regex")
    })
}

/// Path component of `url`, falling back to the raw string minus query and
/// fragment when it does not parse.
fn url_path(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

pub fn has_blacklisted_extension(url: &str) -> bool {
    extension_filter().is_match(&url_path(url))
}

/// Keeps a crawl focused on pages near mentions of tracked companies.
///
/// Rules, first match decides:
/// 1. a blacklisted extension on the URL path rejects the link;
/// 2. a worker that has completed fewer than `expansion_threshold` visits
///    rejects every link (bootstrap rule);
/// 3. without referring page text the link is rejected;
/// 4. the link is accepted iff the referring text mentions a tracked company.
#[derive(Debug, Clone)]
pub struct FrontierPolicy {
    matcher: Arc<EntityMatcher>,
    expansion_threshold: u64,
}

impl FrontierPolicy {
    pub fn new(matcher: Arc<EntityMatcher>, expansion_threshold: u64) -> Self {
        Self {
            matcher,
            expansion_threshold,
        }
    }

    pub fn should_visit(
        &self,
        referring_page_text: Option<&str>,
        links_visited_so_far: u64,
        candidate_url: &str,
    ) -> bool {
        if has_blacklisted_extension(candidate_url) {
            return false;
        }
        if links_visited_so_far < self.expansion_threshold {
            return false;
        }
        match referring_page_text {
            Some(text) => self.matcher.is_match(text),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(threshold: u64) -> FrontierPolicy {
        let matcher = Arc::new(EntityMatcher::build(["Acme Corp", "Globex"]));
        FrontierPolicy::new(matcher, threshold)
    }

    #[test]
    fn test_blacklisted_extensions_rejected_regardless_of_text() {
        let p = policy(0);
        let text = Some("Acme Corp reports record profits");
        for url in [
            "https://news.example/chart.png",
            "https://news.example/report.PDF",
            "https://news.example/podcast.mp3",
            "https://news.example/archive.zip?dl=1",
            "https://news.example/app.js#main",
        ] {
            assert!(!p.should_visit(text, 10, url), "{url} should be rejected");
        }
    }

    #[test]
    fn test_missing_text_rejected() {
        let p = policy(0);
        assert!(!p.should_visit(None, 10, "https://news.example/markets/acme.html"));
    }

    #[test]
    fn test_accepts_only_when_company_mentioned() {
        let p = policy(0);
        let url = "https://news.example/markets/story";
        assert!(p.should_visit(Some("shares of GLOBEX rallied"), 3, url));
        assert!(!p.should_visit(Some("shares of Initech rallied"), 3, url));
    }

    #[test]
    fn test_bootstrap_threshold() {
        let p = policy(1);
        let url = "https://news.example/markets/story";
        let text = Some("Acme Corp news");
        assert!(!p.should_visit(text, 0, url));
        assert!(p.should_visit(text, 1, url));
        assert!(policy(0).should_visit(text, 0, url));
    }

    #[test]
    fn test_extension_only_checked_on_path() {
        assert!(!has_blacklisted_extension("https://example.png/markets"));
        assert!(!has_blacklisted_extension("https://example.com/page?img=logo.png"));
        assert!(has_blacklisted_extension("https://example.com/static/site.CSS"));
        assert!(!has_blacklisted_extension("https://example.com/jsonfeed"));
    }
}
