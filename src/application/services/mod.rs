pub mod feed_service;
pub mod hydration_service;

pub use feed_service::{FeedIterator, FeedService, IteratorState, StreamQueue};
pub use hydration_service::HydrationService;
