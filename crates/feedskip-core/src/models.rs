use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Platform;

/// Direct mode opens the platform itself; in-app mode keeps the user here
/// and renders results inline (Reddit only, for now).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Direct,
    InApp,
}

/// One user-initiated search. Created per action, discarded after the
/// dispatch completes.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub platform: Platform,
    pub mode: SearchMode,
    pub locale: Option<String>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, platform: Platform) -> Self {
        Self {
            text: text.into(),
            platform,
            mode: SearchMode::Direct,
            locale: None,
        }
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

/// Normalized result - the common shape every provider reduces to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// Derived from platform + content URL, so it is stable across
    /// re-fetches and unique within one result set.
    pub id: String,
    pub title: String,
    pub description: String,
    pub content_url: String,
    pub thumbnail_url: Option<String>,
    pub result_type: ResultType,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// True when this result was synthesized because the upstream source
    /// yielded nothing usable.
    pub is_synthesized_fallback: bool,
}

impl SearchResult {
    /// Stable id for a result living at `content_url` on `platform`.
    pub fn derive_id(platform: Platform, content_url: &str) -> String {
        format!("{}:{}", platform.slug(), content_url)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Video,
    Post,
    Article,
    Image,
    User,
    Website,
    News,
    Product,
}

/// One page of Reddit results. Callers own accumulation: append `items`,
/// replace `after_token` and `has_more`.
#[derive(Debug, Clone, Default)]
pub struct RedditPage {
    pub items: Vec<SearchResult>,
    pub after_token: Option<String>,
    pub has_more: bool,
}

impl RedditPage {
    /// `has_more` is exactly "cursor present".
    pub fn new(items: Vec<SearchResult>, after_token: Option<String>) -> Self {
        let has_more = after_token.is_some();
        Self {
            items,
            after_token,
            has_more,
        }
    }
}

/// The channel a dispatch went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Native,
    Universal,
    Browser,
    Embedded,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Native => "native",
            Channel::Universal => "universal",
            Channel::Browser => "browser",
            Channel::Embedded => "embedded",
        }
    }
}

/// Terminal outcome of one dispatch. Emitted exactly once per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Channel that succeeded, or the last one attempted on failure.
    /// None when no channel was ever tried (e.g. empty query).
    pub channel: Option<Channel>,
    pub succeeded: bool,
    pub error: Option<crate::ErrorKind>,
}

impl DispatchOutcome {
    pub fn success(channel: Channel) -> Self {
        Self {
            channel: Some(channel),
            succeeded: true,
            error: None,
        }
    }

    pub fn failure(channel: Option<Channel>, error: crate::ErrorKind) -> Self {
        Self {
            channel,
            succeeded: false,
            error: Some(error),
        }
    }
}

/// A completed search, as handed to the history collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub query: String,
    pub platform: Platform,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn now(query: impl Into<String>, platform: Platform) -> Self {
        Self {
            query: query.into(),
            platform,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_has_more_tracks_the_cursor() {
        let page = RedditPage::new(vec![], Some("t3_x".into()));
        assert!(page.has_more);

        let page = RedditPage::new(vec![], None);
        assert!(!page.has_more);
    }

    #[test]
    fn result_id_is_stable_and_platform_scoped() {
        let a = SearchResult::derive_id(Platform::Reddit, "https://r/x");
        let b = SearchResult::derive_id(Platform::Reddit, "https://r/x");
        let c = SearchResult::derive_id(Platform::X, "https://r/x");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
