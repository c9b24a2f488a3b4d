use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Title, visible body text and outbound links of an HTML document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedHtml {
    pub title: Option<String>,
    pub text: String,
    pub links: Vec<String>,
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve `href` against `base`, keeping only http(s) targets and dropping
/// the fragment so one page is scheduled once.
pub fn normalize_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }
    let mut resolved = base.join(href).ok()?;
    if resolved.scheme() != "http" && resolved.scheme() != "https" {
        return None;
    }
    resolved.set_fragment(None);
    Some(resolved.to_string())
}

/// Elements whose text is never rendered as page content.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Text nodes under `root`, skipping script and style data.
fn visible_text(root: ElementRef<'_>) -> String {
    root.descendants()
        .filter(|node| {
            !node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
            })
        })
        .filter_map(|node| node.value().as_text().map(|t| t.trim().to_string()))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_html(page_url: &str, html: &str) -> ParsedHtml {
    let document = Html::parse_document(html);

    let title = Selector::parse("title").ok().and_then(|sel| {
        document
            .select(&sel)
            .next()
            .map(|t| collapse_whitespace(&t.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    });

    let text = Selector::parse("body")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .map(|body| collapse_whitespace(&visible_text(body)))
        .unwrap_or_default();

    let mut links = Vec::new();
    if let (Ok(base), Ok(anchor)) = (Url::parse(page_url), Selector::parse("a[href]")) {
        for element in document.select(&anchor) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if let Some(link) = normalize_link(&base, href) {
                if !links.contains(&link) {
                    links.push(link);
                }
            }
        }
    }

    ParsedHtml { title, text, links }
}
