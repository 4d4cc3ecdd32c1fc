//! Tiered search dispatch.
//!
//! One dispatch walks an ordered channel plan - native deep link, then the
//! canonical web URL, then an explicit browser open - stopping at the
//! first channel that reports success. Reddit in-app mode and TikTok's
//! embedded surface bypass the URI tiers entirely. The original design
//! chained nested completion handlers for this; here the plan is an
//! explicit list evaluated by a small state machine, so each tier is
//! testable on its own.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::catalog::Platform;
use crate::config::DispatchConfig;
use crate::models::{Channel, DispatchOutcome, RedditPage, SearchMode, SearchQuery};
use crate::providers::RedditProvider;
use crate::recent::RecentQueries;
use crate::Error;

/// Opens URIs through the host OS. The native-handler probe is
/// environment knowledge the dispatcher cannot compute itself.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UriOpener: Send + Sync {
    /// Is a native handler for this platform plausibly installed?
    fn can_open_native(&self, platform: Platform) -> bool;

    /// Hand a URI to the OS. For https URLs the OS may route to an
    /// installed app or a browser; we don't distinguish.
    async fn open(&self, uri: &str) -> bool;

    /// Force the URL into a browser, bypassing app routing.
    async fn open_in_browser(&self, url: &str) -> bool;
}

/// An in-app browsing surface (web view or equivalent) the host can show.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddedSurface: Send + Sync {
    /// Open the surface at `url`, pre-filling `prefill` into the page's
    /// search box where possible. Returns whether the surface opened.
    async fn open_search(&self, url: &str, prefill: &str) -> bool;
}

#[cfg_attr(test, mockall::automock)]
pub trait HistoryRecorder: Send + Sync {
    fn record(&self, query: &str, platform: Platform);
}

#[cfg_attr(test, mockall::automock)]
pub trait AnalyticsRecorder: Send + Sync {
    fn record_search(&self, platform: Platform);
}

#[cfg_attr(test, mockall::automock)]
pub trait LocalizationProvider: Send + Sync {
    fn current_language_code(&self) -> Option<String>;
}

/// Optional clipboard hook for the config-gated assist behavior.
#[cfg_attr(test, mockall::automock)]
pub trait ClipboardWriter: Send + Sync {
    fn copy(&self, text: &str) -> bool;
}

/// Where a dispatch currently is. Purely observational; the plan itself
/// drives progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispatchState {
    Idle,
    Attempting(Channel),
    Completed,
}

/// What one dispatch produced: the terminal outcome, plus the first page
/// of results when the Reddit in-app path ran.
#[derive(Debug)]
pub struct DispatchResult {
    pub outcome: DispatchOutcome,
    pub in_app: Option<RedditPage>,
}

impl DispatchResult {
    fn opened(outcome: DispatchOutcome) -> Self {
        Self {
            outcome,
            in_app: None,
        }
    }
}

/// Orchestrates a single search end to end. One instance per session,
/// collaborators injected - no ambient globals.
pub struct SearchDispatcher {
    opener: Arc<dyn UriOpener>,
    surface: Arc<dyn EmbeddedSurface>,
    history: Arc<dyn HistoryRecorder>,
    analytics: Arc<dyn AnalyticsRecorder>,
    localization: Option<Arc<dyn LocalizationProvider>>,
    clipboard: Option<Arc<dyn ClipboardWriter>>,
    reddit: Arc<RedditProvider>,
    config: DispatchConfig,
    recent: Mutex<RecentQueries>,
}

impl SearchDispatcher {
    pub fn new(
        opener: Arc<dyn UriOpener>,
        surface: Arc<dyn EmbeddedSurface>,
        history: Arc<dyn HistoryRecorder>,
        analytics: Arc<dyn AnalyticsRecorder>,
    ) -> Self {
        Self {
            opener,
            surface,
            history,
            analytics,
            localization: None,
            clipboard: None,
            reddit: Arc::new(RedditProvider::new()),
            config: DispatchConfig::default(),
            recent: Mutex::new(RecentQueries::new()),
        }
    }

    pub fn with_config(mut self, config: DispatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_reddit_provider(mut self, provider: Arc<RedditProvider>) -> Self {
        self.reddit = provider;
        self
    }

    pub fn with_localization(mut self, localization: Arc<dyn LocalizationProvider>) -> Self {
        self.localization = Some(localization);
        self
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn ClipboardWriter>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    /// Run one search to its terminal outcome. Exactly one outcome per
    /// call; exactly one history/analytics record, and only on success.
    pub async fn dispatch(&self, query: &SearchQuery) -> DispatchResult {
        let platform = query.platform;

        if query.text.is_empty() && !platform.requires_embedded_entry() {
            let err = Error::InvalidQuery;
            warn!(%platform, %err, "rejecting search");
            return DispatchResult::opened(DispatchOutcome::failure(None, err.kind()));
        }

        // The attempt counts as "searched" whether or not a channel
        // succeeds, so recents update before the first tier.
        if !query.text.is_empty() {
            self.recent
                .lock()
                .expect("recent queries poisoned")
                .record(&query.text);
        }

        if self.config.pre_dispatch_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.pre_dispatch_delay_ms)).await;
        }

        if platform == Platform::Reddit && query.mode == SearchMode::InApp {
            return self.dispatch_reddit_in_app(query).await;
        }

        if platform.requires_embedded_entry() {
            return DispatchResult::opened(self.dispatch_embedded(query).await);
        }

        DispatchResult::opened(self.dispatch_tiers(query).await)
    }

    /// Reddit in-app mode: no URI is opened; the first page is fetched
    /// here and further pages go through a RedditSearchSession.
    async fn dispatch_reddit_in_app(&self, query: &SearchQuery) -> DispatchResult {
        debug!(query = %query.text, "reddit in-app search");

        let request = self.reddit.request_for(&query.text);

        match self.reddit.search_page(&request).await {
            Ok(page) => {
                self.record_success(query);
                DispatchResult {
                    outcome: DispatchOutcome::success(Channel::Embedded),
                    in_app: Some(page),
                }
            }
            Err(err) => {
                warn!(error = %err, "in-app reddit search failed");
                DispatchResult::opened(DispatchOutcome::failure(
                    Some(Channel::Embedded),
                    err.kind(),
                ))
            }
        }
    }

    /// TikTok: no native tier exists at all; the embedded surface opens
    /// on the search page and the user finishes entry there.
    async fn dispatch_embedded(&self, query: &SearchQuery) -> DispatchOutcome {
        let url = query.platform.web_search_url(&query.text, self.locale(query).as_deref());
        debug!(%url, "opening embedded surface");

        if self.surface.open_search(&url, &query.text).await {
            self.record_success(query);
            DispatchOutcome::success(Channel::Embedded)
        } else {
            let err = Error::UriLaunchFailure(query.platform.to_string());
            warn!(%err, "embedded surface failed to open");
            DispatchOutcome::failure(Some(Channel::Embedded), err.kind())
        }
    }

    /// The ordered tier walk. Strictly sequential: a tier runs only after
    /// the previous one's attempt resolved negatively, and no channel is
    /// attempted twice.
    async fn dispatch_tiers(&self, query: &SearchQuery) -> DispatchOutcome {
        let platform = query.platform;
        let web_url = platform.web_search_url(&query.text, self.locale(query).as_deref());

        let mut plan: Vec<Channel> = Vec::new();
        if platform.supports_native_search() && self.opener.can_open_native(platform) {
            plan.push(Channel::Native);
        }
        plan.push(Channel::Universal);
        plan.push(Channel::Browser);

        let mut state = DispatchState::Idle;
        debug!(?state, %platform, plan_len = plan.len(), "dispatch starting");
        let mut last_attempted = None;

        for channel in plan {
            state = DispatchState::Attempting(channel);
            last_attempted = Some(channel);
            debug!(?state, %platform, "attempting channel");

            let opened = match channel {
                Channel::Native => self.attempt_native(query).await,
                Channel::Universal => self.opener.open(&web_url).await,
                Channel::Browser => self.opener.open_in_browser(&web_url).await,
                Channel::Embedded => unreachable!("embedded never enters the tier plan"),
            };

            if opened {
                state = DispatchState::Completed;
                debug!(?state, channel = channel.as_str(), "dispatch succeeded");
                self.record_success(query);
                return DispatchOutcome::success(channel);
            }

            // Launch failure is recovered locally: fall through to the
            // next tier.
            debug!(channel = channel.as_str(), "channel failed, advancing");
        }

        state = DispatchState::Completed;
        let err = Error::UriLaunchFailure(platform.to_string());
        info!(?state, %err, "all channels exhausted");
        DispatchOutcome::failure(last_attempted, err.kind())
    }

    async fn attempt_native(&self, query: &SearchQuery) -> bool {
        if self.config.clipboard_assist {
            if let Some(clipboard) = &self.clipboard {
                clipboard.copy(&query.text);
            }
        }

        // Several schemes can exist for one platform (x:// vs twitter://);
        // the first that opens wins.
        for uri in query.platform.native_search_uris(&query.text) {
            if self.opener.open(&uri).await {
                return true;
            }
        }
        false
    }

    fn record_success(&self, query: &SearchQuery) {
        self.analytics.record_search(query.platform);
        if !query.text.is_empty() {
            self.history.record(&query.text, query.platform);
        }
    }

    fn locale(&self, query: &SearchQuery) -> Option<String> {
        query
            .locale
            .clone()
            .or_else(|| self.localization.as_ref().and_then(|l| l.current_language_code()))
            .or_else(|| self.config.fallback_locale.clone())
    }

    /// Recent queries, newest first.
    pub fn recent_queries(&self) -> Vec<String> {
        self.recent
            .lock()
            .expect("recent queries poisoned")
            .entries()
            .to_vec()
    }

    pub fn clear_recent_queries(&self) {
        self.recent.lock().expect("recent queries poisoned").clear();
    }
}
