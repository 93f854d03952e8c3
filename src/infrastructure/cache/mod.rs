pub mod disk_cache;
pub mod memory_cache;
pub mod tiered_cache;

pub use disk_cache::SqlitePostStore;
pub use memory_cache::MemoryPostCache;
pub use tiered_cache::TieredPostCache;
