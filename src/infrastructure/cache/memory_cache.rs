use crate::domain::entities::Post;
use crate::domain::value_objects::VersionedId;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// メモリ層（ホットサブセット）
///
/// LRU で容量を抑える。ディスク層が真正のサブセットを持つので、
/// ここから溢れてもデータは失われない。
pub struct MemoryPostCache {
    entries: Mutex<LruCache<String, Post>>,
}

impl MemoryPostCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity is non-zero");
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn contains(&self, id: &VersionedId) -> bool {
        self.entries
            .lock()
            .expect("memory cache poisoned")
            .contains(&id.cache_key())
    }

    pub fn get(&self, id: &VersionedId) -> Option<Post> {
        self.entries
            .lock()
            .expect("memory cache poisoned")
            .get(&id.cache_key())
            .cloned()
    }

    pub fn put(&self, post: &Post) {
        self.entries
            .lock()
            .expect("memory cache poisoned")
            .put(post.cache_key(), post.clone());
    }

    pub fn clear(&self) {
        self.entries.lock().expect("memory cache poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("memory cache poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
