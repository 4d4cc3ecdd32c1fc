// Core business logic lives here - the brain of the operation
pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod normalize;
pub mod providers;
pub mod recent;

pub use catalog::Platform;
pub use config::Config;
pub use dispatch::{DispatchResult, SearchDispatcher};
pub use error::{Error, ErrorKind};
pub use models::{
    Channel, DispatchOutcome, RedditPage, ResultType, SearchMode, SearchQuery, SearchResult,
};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
