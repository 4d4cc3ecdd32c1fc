use std::process::Command;
use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feedskip_api::reddit::{RedditClient, RedditSort, RedditTimeFilter};
use feedskip_core::dispatch::{
    AnalyticsRecorder, EmbeddedSurface, HistoryRecorder, LocalizationProvider, UriOpener,
};
use feedskip_core::models::HistoryEntry;
use feedskip_core::providers::{RedditProvider, RedditSearchSession, TikTokProvider};
use feedskip_core::{Config, Platform, SearchDispatcher, SearchMode, SearchQuery, SearchResult};

#[derive(Parser)]
#[command(name = "feedskip")]
#[command(version, about = "Search social platforms without touching their feeds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Dispatch a search to a platform (native app, web, or embedded)
    Search {
        /// Search query (may be empty only for tiktok)
        #[arg(default_value = "")]
        query: String,
        /// Target platform: youtube, reddit, x, tiktok, instagram, facebook
        #[arg(short, long, default_value = "reddit")]
        platform: String,
        /// Use in-app results instead of opening the platform (reddit only)
        #[arg(long)]
        in_app: bool,
        /// Locale appended to web URLs where supported
        #[arg(short, long)]
        locale: Option<String>,
    },
    /// Search Reddit in-app with pagination
    Reddit {
        query: String,
        /// Restrict to one subreddit
        #[arg(short, long)]
        subreddit: Option<String>,
        /// relevance, hot, top, new, comments (defaults from config)
        #[arg(long)]
        sort: Option<String>,
        /// all, year, month, week, day, hour (defaults from config)
        #[arg(long)]
        time: Option<String>,
        /// How many pages to fetch
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Print suggested links scraped from the TikTok search page
    Tiktok { query: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feedskip=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Search {
            query,
            platform,
            in_app,
            locale,
        } => {
            let platform: Platform = platform
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;

            let dispatcher = SearchDispatcher::new(
                Arc::new(SystemOpener),
                Arc::new(TerminalSurface::new()),
                Arc::new(LogHistory),
                Arc::new(LogAnalytics),
            )
            .with_config(config.dispatch.clone())
            .with_localization(Arc::new(EnvLocale))
            .with_reddit_provider(Arc::new(
                RedditProvider::with_client(RedditClient::with_base_url(
                    config.reddit.base_url.clone(),
                ))
                .with_defaults(config.reddit.default_sort, config.reddit.default_time_filter),
            ));

            let mut search = SearchQuery::new(query, platform);
            if in_app {
                search = search.with_mode(SearchMode::InApp);
            }
            if let Some(locale) = locale {
                search = search.with_locale(locale);
            }

            let result = dispatcher.dispatch(&search).await;
            if let Some(page) = result.in_app {
                print_results(&page.items);
                if page.has_more {
                    println!("(more available - use the reddit subcommand to paginate)");
                }
            }
            match result.outcome.channel {
                Some(channel) if result.outcome.succeeded => {
                    println!("Opened via the {} channel", channel.as_str());
                }
                _ => {
                    anyhow::bail!("search failed: {:?}", result.outcome.error);
                }
            }
        }
        Commands::Reddit {
            query,
            subreddit,
            sort,
            time,
            pages,
        } => {
            let sort = match sort {
                Some(s) => parse_sort(&s)?,
                None => config.reddit.default_sort,
            };
            let time_filter = match time {
                Some(t) => parse_time(&t)?,
                None => config.reddit.default_time_filter,
            };

            let provider = Arc::new(
                RedditProvider::with_client(RedditClient::with_base_url(
                    config.reddit.base_url.clone(),
                ))
                .with_defaults(sort, time_filter),
            );
            let mut request = provider.request_for(&query);
            request.subreddit = subreddit;
            let session = RedditSearchSession::new(provider, request);

            for _ in 0..pages.max(1) {
                session.load_next_page().await?;
                if !session.has_more() {
                    break;
                }
            }
            print_results(&session.results());
        }
        Commands::Tiktok { query } => {
            let provider = TikTokProvider::new();
            let results = provider.suggested_links(&query).await?;
            print_results(&results);
        }
    }

    Ok(())
}

fn parse_sort(s: &str) -> anyhow::Result<RedditSort> {
    Ok(match s {
        "relevance" => RedditSort::Relevance,
        "hot" => RedditSort::Hot,
        "top" => RedditSort::Top,
        "new" => RedditSort::New,
        "comments" => RedditSort::Comments,
        other => anyhow::bail!("unknown sort: {other}"),
    })
}

fn parse_time(s: &str) -> anyhow::Result<RedditTimeFilter> {
    Ok(match s {
        "all" => RedditTimeFilter::All,
        "year" => RedditTimeFilter::Year,
        "month" => RedditTimeFilter::Month,
        "week" => RedditTimeFilter::Week,
        "day" => RedditTimeFilter::Day,
        "hour" => RedditTimeFilter::Hour,
        other => anyhow::bail!("unknown time filter: {other}"),
    })
}

fn print_results(results: &[SearchResult]) {
    for (i, result) in results.iter().enumerate() {
        let marker = if result.is_synthesized_fallback {
            " (suggested)"
        } else {
            ""
        };
        println!("{}. {}{}", i + 1, result.title, marker);
        println!("   {}", result.description);
        println!("   {}", result.content_url);
    }
}

/// Hands URIs to the desktop. None of the mobile app schemes resolve on a
/// desktop, so the native probe always answers no and dispatches go
/// straight to the web tier.
struct SystemOpener;

fn open_with_system(target: &str) -> bool {
    #[cfg(target_os = "macos")]
    let launcher = "open";
    #[cfg(not(target_os = "macos"))]
    let launcher = "xdg-open";

    match Command::new(launcher).arg(target).spawn() {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(%target, %err, "failed to launch");
            false
        }
    }
}

#[async_trait]
impl UriOpener for SystemOpener {
    fn can_open_native(&self, _platform: Platform) -> bool {
        false
    }

    async fn open(&self, uri: &str) -> bool {
        open_with_system(uri)
    }

    async fn open_in_browser(&self, url: &str) -> bool {
        open_with_system(url)
    }
}

/// Terminal stand-in for the in-app web view: opens the page in the
/// browser and prints scraped suggestions alongside.
struct TerminalSurface {
    tiktok: TikTokProvider,
}

impl TerminalSurface {
    fn new() -> Self {
        Self {
            tiktok: TikTokProvider::new(),
        }
    }
}

#[async_trait]
impl EmbeddedSurface for TerminalSurface {
    async fn open_search(&self, url: &str, prefill: &str) -> bool {
        if !open_with_system(url) {
            return false;
        }
        if !prefill.is_empty() {
            match self.tiktok.suggested_links(prefill).await {
                Ok(results) => print_results(&results),
                Err(err) => tracing::warn!(%err, "could not fetch suggested links"),
            }
        }
        true
    }
}

struct LogHistory;

impl HistoryRecorder for LogHistory {
    fn record(&self, query: &str, platform: Platform) {
        let entry = HistoryEntry::now(query, platform);
        tracing::info!(
            query = %entry.query,
            platform = %entry.platform,
            at = %entry.timestamp,
            "recorded search"
        );
    }
}

/// Pulls the UI language from the environment, `en_US.UTF-8` style.
struct EnvLocale;

impl LocalizationProvider for EnvLocale {
    fn current_language_code(&self) -> Option<String> {
        std::env::var("LANG")
            .ok()
            .and_then(|l| l.split(['_', '.']).next().map(str::to_string))
            .filter(|code| !code.is_empty() && code != "C")
    }
}

struct LogAnalytics;

impl AnalyticsRecorder for LogAnalytics {
    fn record_search(&self, platform: Platform) {
        tracing::debug!(%platform, "search counted");
    }
}
