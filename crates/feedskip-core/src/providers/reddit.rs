// Reddit provider - bridges the raw listing client with the normalized
// result model and owns cursor-based pagination.
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use feedskip_api::reddit::{RedditClient, RedditSearchRequest, RedditSort, RedditTimeFilter};

use crate::models::{RedditPage, SearchResult};
use crate::normalize;
use crate::Result;

pub struct RedditProvider {
    client: RedditClient,
    default_sort: RedditSort,
    default_time_filter: RedditTimeFilter,
}

impl RedditProvider {
    pub fn new() -> Self {
        Self::with_client(RedditClient::new())
    }

    pub fn with_client(client: RedditClient) -> Self {
        Self {
            client,
            default_sort: RedditSort::default(),
            default_time_filter: RedditTimeFilter::default(),
        }
    }

    /// Sort and time window used for requests built by [`request_for`],
    /// typically fed from the reddit config section.
    ///
    /// [`request_for`]: Self::request_for
    pub fn with_defaults(mut self, sort: RedditSort, time_filter: RedditTimeFilter) -> Self {
        self.default_sort = sort;
        self.default_time_filter = time_filter;
        self
    }

    /// Build a request for `query` carrying this provider's defaults.
    pub fn request_for(&self, query: &str) -> RedditSearchRequest {
        RedditSearchRequest {
            query: query.to_string(),
            sort: self.default_sort,
            time_filter: self.default_time_filter,
            ..Default::default()
        }
    }

    /// Fetch and normalize one page.
    ///
    /// A well-formed listing that parses down to zero usable posts comes
    /// back as two synthesized fallback links, never as an empty page. A
    /// body that is not a listing at all surfaces as MalformedResponse.
    pub async fn search_page(&self, req: &RedditSearchRequest) -> Result<RedditPage> {
        let listing = self.client.search(req).await?;

        let mut items: Vec<SearchResult> = Vec::new();
        for child in &listing.children {
            if let Some(result) = normalize::reddit_post(&child.data) {
                // Crossposts can repeat a permalink within one listing
                if !items.iter().any(|r| r.id == result.id) {
                    items.push(result);
                }
            }
        }

        if items.is_empty() {
            debug!(query = %req.query, "listing parsed to nothing, synthesizing fallback");
            return Ok(RedditPage::new(normalize::reddit_fallback(&req.query), None));
        }

        Ok(RedditPage::new(items, listing.after))
    }
}

impl Default for RedditProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// What a load attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Appended this many new results.
    Loaded(usize),
    /// No-op: a fetch was already in flight, or there is nothing more.
    Skipped,
    /// The session was cancelled while the fetch was out; results dropped.
    Discarded,
}

/// One results screen's worth of pagination state.
///
/// Load calls are serialized: a second call while one is outstanding is a
/// no-op, not a queue. Cancellation uses a generation counter so a fetch
/// that lands after `cancel()` is discarded instead of mutating state the
/// screen no longer shows.
pub struct RedditSearchSession {
    provider: Arc<RedditProvider>,
    base_request: RedditSearchRequest,
    state: Mutex<SessionState>,
    in_flight: AtomicBool,
    generation: AtomicU64,
}

#[derive(Default)]
struct SessionState {
    items: Vec<SearchResult>,
    after_token: Option<String>,
    has_more: bool,
    started: bool,
}

impl RedditSearchSession {
    pub fn new(provider: Arc<RedditProvider>, request: RedditSearchRequest) -> Self {
        Self {
            provider,
            base_request: request,
            state: Mutex::new(SessionState::default()),
            in_flight: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    /// Fetch the next page (or the first, if none has loaded yet) and
    /// append its items.
    pub async fn load_next_page(&self) -> Result<LoadOutcome> {
        // Single-flight: lose the race, skip the fetch.
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(LoadOutcome::Skipped);
        }

        // Cursor snapshot happens only after winning the flag; a load
        // that completed in between is seen, not refetched.
        let after = {
            let state = self.state.lock().expect("session state poisoned");
            if state.started && !state.has_more {
                self.in_flight.store(false, Ordering::Release);
                return Ok(LoadOutcome::Skipped);
            }
            state.after_token.clone()
        };

        let generation = self.generation.load(Ordering::Acquire);

        let mut request = self.base_request.clone();
        request.after = after;

        let fetched = self.provider.search_page(&request).await;
        self.in_flight.store(false, Ordering::Release);

        let page = match fetched {
            Ok(page) => page,
            Err(err) => return Err(err),
        };

        if self.generation.load(Ordering::Acquire) != generation {
            debug!("session cancelled mid-fetch, discarding page");
            return Ok(LoadOutcome::Discarded);
        }

        let mut state = self.state.lock().expect("session state poisoned");
        let added = page.items.len();
        state.items.extend(page.items);
        state.after_token = page.after_token;
        state.has_more = page.has_more;
        state.started = true;
        Ok(LoadOutcome::Loaded(added))
    }

    /// Drop any fetch that is currently out. The session can be reused
    /// afterwards; only in-flight results are affected.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    pub fn results(&self) -> Vec<SearchResult> {
        self.state.lock().expect("session state poisoned").items.clone()
    }

    pub fn has_more(&self) -> bool {
        let state = self.state.lock().expect("session state poisoned");
        !state.started || state.has_more
    }

    pub fn query(&self) -> &str {
        &self.base_request.query
    }
}
