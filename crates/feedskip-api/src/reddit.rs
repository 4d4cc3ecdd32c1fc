use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::retry::{is_retryable_status, with_retry, RetryConfig};

const REDDIT_BASE: &str = "https://www.reddit.com";

/// Results per page. Reddit accepts up to 100 but 25 keeps responses
/// small enough for mobile-grade connections.
pub const PAGE_SIZE: u32 = 25;

#[derive(Error, Debug)]
pub enum RedditError {
    #[error("search request failed: {0}")]
    RequestFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    // Decode failures are surfaced, not downgraded: an undecodable body
    // means the upstream contract changed, not "no matches".
    #[error("response body is not a Reddit listing: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RedditError>;

/// Sort order understood by Reddit's search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedditSort {
    #[default]
    Relevance,
    Hot,
    Top,
    New,
    Comments,
}

impl RedditSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedditSort::Relevance => "relevance",
            RedditSort::Hot => "hot",
            RedditSort::Top => "top",
            RedditSort::New => "new",
            RedditSort::Comments => "comments",
        }
    }
}

/// Time window for the `t` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedditTimeFilter {
    #[default]
    All,
    Year,
    Month,
    Week,
    Day,
    Hour,
}

impl RedditTimeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedditTimeFilter::All => "all",
            RedditTimeFilter::Year => "year",
            RedditTimeFilter::Month => "month",
            RedditTimeFilter::Week => "week",
            RedditTimeFilter::Day => "day",
            RedditTimeFilter::Hour => "hour",
        }
    }
}

/// One search request against the listing endpoint.
#[derive(Debug, Clone, Default)]
pub struct RedditSearchRequest {
    pub query: String,
    pub sort: RedditSort,
    pub time_filter: RedditTimeFilter,
    /// Continuation cursor from the previous page, echoed verbatim.
    pub after: Option<String>,
    /// Restrict the search to one subreddit.
    pub subreddit: Option<String>,
}

pub struct RedditClient {
    client: reqwest::Client,
    base_url: String,
    retry_config: RetryConfig,
}

impl RedditClient {
    pub fn new() -> Self {
        Self::with_base_url(REDDIT_BASE.to_string())
    }

    /// Mainly for tests that point the client at a local mock server.
    pub fn with_base_url(base_url: String) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("feedskip/0.1.0"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url,
            retry_config: RetryConfig::default(),
        }
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run one page of a search. Pagination is the caller's business: feed
    /// the returned `after` cursor into the next request.
    pub async fn search(&self, req: &RedditSearchRequest) -> Result<RedditListing> {
        let url = match &req.subreddit {
            Some(sub) => format!("{}/r/{}/search.json", self.base_url, sub),
            None => format!("{}/search.json", self.base_url),
        };

        let limit = PAGE_SIZE.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("q", req.query.as_str()),
            ("sort", req.sort.as_str()),
            ("t", req.time_filter.as_str()),
            ("limit", &limit),
            // Without raw_json Reddit HTML-escapes text fields
            ("raw_json", "1"),
        ];
        if req.subreddit.is_some() {
            params.push(("restrict_sr", "1"));
        }
        if let Some(after) = &req.after {
            params.push(("after", after.as_str()));
        }

        with_retry(&self.retry_config, || async {
            debug!(url = %url, query = %req.query, after = ?req.after, "reddit search");

            let response = self.client.get(&url).query(&params).send().await?;

            if response.status() == 429 {
                return Err(RedditError::RateLimitExceeded);
            }

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();

                if is_retryable_status(status) {
                    return Err(RedditError::RequestFailed(format!(
                        "Status {}: {}",
                        status, body
                    )));
                }

                return Err(RedditError::RequestFailed(format!(
                    "Status {}: {}",
                    status, body
                )));
            }

            // Decode from text rather than response.json() so a non-JSON
            // body maps to MalformedResponse instead of a reqwest error.
            let body = response.text().await?;
            let envelope: RedditEnvelope = serde_json::from_str(&body)?;
            Ok(envelope.data)
        })
        .await
    }
}

impl Default for RedditClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RedditEnvelope {
    data: RedditListing,
}

/// One page of listing children plus the continuation cursor.
#[derive(Debug, Clone, Deserialize)]
pub struct RedditListing {
    #[serde(default)]
    pub children: Vec<RedditChild>,
    pub after: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditChild {
    pub data: RedditPost,
}

/// A listing child as Reddit serves it. Everything beyond the id is
/// optional; the normalizer decides what is usable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedditPost {
    #[serde(default)]
    pub id: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subreddit: Option<String>,
    pub permalink: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: i64,
    pub selftext: Option<String>,
    #[serde(default)]
    pub is_video: bool,
    pub thumbnail: Option<String>,
    pub url: Option<String>,
    pub preview: Option<RedditPreview>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditPreview {
    #[serde(default)]
    pub images: Vec<RedditPreviewImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditPreviewImage {
    pub source: RedditImageSource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditImageSource {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}
