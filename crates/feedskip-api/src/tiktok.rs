use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, trace};
use url::Url;

use crate::retry::{is_retryable_status, with_retry, RetryConfig};

const TIKTOK_SEARCH_URL: &str = "https://www.tiktok.com/search";

/// Desktop user agent. The mobile page is a JS shell with nothing to
/// scrape; the desktop variant still server-renders anchor tags.
const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Most results a single extraction pass will return.
pub const MAX_EXTRACTED_LINKS: usize = 10;

// Visible anchor text outside this range is navigation chrome or a
// truncated blob, not a result title.
const MIN_TEXT_LEN: usize = 10;
const MAX_TEXT_LEN: usize = 100;

// Hosts that are page furniture rather than content: TikTok's own
// navigation plus its CDN/static domains.
const CHROME_DOMAINS: &[&str] = &["tiktok.com", "tiktokcdn.com", "ttwstatic.com", "bytedance.com"];

// Ordered broad-to-narrow. Later patterns only add candidates the earlier
// ones missed; first occurrence of a href wins.
static ANCHOR_WITH_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a[^>]+href="(https?://[^"]+)"[^>]*>\s*([^<]+?)\s*</a>"#).unwrap()
});
static ANCHOR_WITH_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a[^>]+href="(https?://[^"]+)"[^>]*>\s*<span[^>]*>\s*([^<]+?)\s*</span>"#)
        .unwrap()
});
static HEADING_WRAPPED_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<h[1-4][^>]*>\s*<a[^>]+href="(https?://[^"]+)"[^>]*>\s*([^<]+?)\s*</a>\s*</h[1-4]>"#,
    )
    .unwrap()
});

#[derive(Error, Debug)]
pub enum TikTokError {
    #[error("search page fetch failed: {0}")]
    RequestFailed(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, TikTokError>;

/// A candidate link pulled out of the raw search page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    pub href: String,
    pub text: String,
}

impl ExtractedLink {
    /// Host portion of the href, or empty when the href does not parse.
    pub fn domain(&self) -> String {
        Url::parse(&self.href)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
            .unwrap_or_default()
    }
}

pub struct TikTokClient {
    client: reqwest::Client,
    search_url: String,
    retry_config: RetryConfig,
}

impl TikTokClient {
    pub fn new() -> Self {
        Self::with_search_url(TIKTOK_SEARCH_URL.to_string())
    }

    pub fn with_search_url(search_url: String) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(DESKTOP_USER_AGENT),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            search_url,
            retry_config: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Fetch the raw HTML of a search results page.
    pub async fn fetch_search_page(&self, query: &str) -> Result<String> {
        with_retry(&self.retry_config, || async {
            debug!(query, "fetching tiktok search page");

            let response = self
                .client
                .get(&self.search_url)
                .query(&[("q", query)])
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                if is_retryable_status(status) {
                    return Err(TikTokError::RequestFailed(format!("Status {}", status)));
                }
                return Err(TikTokError::RequestFailed(format!("Status {}", status)));
            }

            let html = response.text().await?;
            trace!(bytes = html.len(), "tiktok search page received");
            Ok(html)
        })
        .await
    }
}

impl Default for TikTokClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull candidate result links out of raw search-page HTML.
///
/// Separate from the fetch so tests run against fixtures, never the live
/// site. Returns at most [`MAX_EXTRACTED_LINKS`] links, de-duplicated by
/// href across all heuristics. An empty return means the caller should
/// synthesize fallback results; this function never invents links.
pub fn extract_links(html: &str) -> Vec<ExtractedLink> {
    let heuristics: [&Regex; 3] = [
        &ANCHOR_WITH_TEXT,
        &ANCHOR_WITH_SPAN,
        &HEADING_WRAPPED_ANCHOR,
    ];

    let mut links: Vec<ExtractedLink> = Vec::new();

    'outer: for heuristic in heuristics {
        for caps in heuristic.captures_iter(html) {
            let href = caps[1].to_string();
            let text = collapse_whitespace(&caps[2]);

            if !accept_candidate(&href, &text) {
                continue;
            }
            if links.iter().any(|l| l.href == href) {
                continue;
            }

            links.push(ExtractedLink { href, text });
            if links.len() >= MAX_EXTRACTED_LINKS {
                break 'outer;
            }
        }
    }

    debug!(count = links.len(), "extracted candidate links");
    links
}

fn accept_candidate(href: &str, text: &str) -> bool {
    // Character count, not bytes: titles are routinely non-ASCII
    let chars = text.chars().count();
    if chars < MIN_TEXT_LEN || chars > MAX_TEXT_LEN {
        return false;
    }
    let host = match Url::parse(href).ok().and_then(|u| u.host_str().map(String::from)) {
        Some(h) => h,
        None => return false,
    };
    !CHROME_DOMAINS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{}", d)))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
