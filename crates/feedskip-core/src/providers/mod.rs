// Provider implementations for platforms with in-app content retrieval
pub mod reddit;
pub mod tiktok;

pub use reddit::{LoadOutcome, RedditProvider, RedditSearchSession};
pub use tiktok::TikTokProvider;
