pub mod content_fetcher;
pub mod feed_transport;
pub mod post_cache;

pub use content_fetcher::ContentFetcher;
pub use feed_transport::{FeedSubscription, FeedTransport, StreamEvent};
pub use post_cache::PostCache;
