pub mod content_blob;
pub mod feed_filter;
pub mod versioned_id;

pub use content_blob::ContentBlob;
pub use feed_filter::FeedFilter;
pub use versioned_id::VersionedId;
