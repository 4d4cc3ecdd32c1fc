// Raw upstream clients: Reddit's public JSON search and the TikTok search page
pub mod reddit;
pub mod retry;
pub mod tiktok;

// Re-export common types
pub use reddit::{RedditClient, RedditListing, RedditPost, RedditSearchRequest};
pub use retry::RetryConfig;
pub use tiktok::{extract_links, ExtractedLink, TikTokClient};
