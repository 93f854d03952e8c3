use super::disk_cache::SqlitePostStore;
use super::memory_cache::MemoryPostCache;
use crate::application::ports::PostCache;
use crate::domain::entities::Post;
use crate::domain::value_objects::VersionedId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use tracing::warn;

/// メモリ + ディスクのライトスルーキャッシュ
///
/// 書き込みは両層を一緒に更新し、ディスクがメモリより先行することはない。
/// 読み出しの失敗は「キャッシュされていない」に落ちるソフトエラー。
pub struct TieredPostCache {
    memory: MemoryPostCache,
    disk: SqlitePostStore,
}

impl TieredPostCache {
    pub fn new(memory: MemoryPostCache, disk: SqlitePostStore) -> Self {
        Self { memory, disk }
    }
}

#[async_trait]
impl PostCache for TieredPostCache {
    async fn exists(&self, id: &VersionedId) -> bool {
        if self.memory.contains(id) {
            return true;
        }
        match self.disk.exists(id).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Cache existence probe failed for {id}: {e}");
                false
            }
        }
    }

    async fn get(&self, id: &VersionedId) -> Option<Post> {
        if let Some(post) = self.memory.get(id) {
            return Some(post);
        }

        match self.disk.get(id).await {
            Ok(Some(post)) => {
                // ディスクヒットはホット層へ昇格させる
                self.memory.put(&post);
                Some(post)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Cache read failed for {id}, degrading to miss: {e}");
                None
            }
        }
    }

    async fn put(&self, post: &Post) -> Result<(), AppError> {
        // メモリを先に更新する。ディスクが失敗してもメモリは巻き戻さない
        self.memory.put(post);

        self.disk
            .put(post)
            .await
            .map_err(|e| AppError::CacheWrite(e.to_string()))
    }

    async fn get_many(&self, ids: &[VersionedId]) -> Vec<Option<Post>> {
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            results.push(self.get(id).await);
        }
        results
    }

    async fn clear(&self) -> Result<(), AppError> {
        self.memory.clear();
        self.disk.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{
        AuthorRef, InteractionStats, PostBody, PostMetadata, PostState, TextBody, ViewerState,
    };
    use crate::infrastructure::database::ConnectionPool;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_post(version: i64) -> Post {
        Post::new(
            PostMetadata {
                id: VersionedId::new(Uuid::new_v4(), version),
                author: AuthorRef::new(Uuid::new_v4(), "alice".to_string()),
                created_at: Utc::now(),
                state: PostState::Active,
                kind: "post".to_string(),
                stats: InteractionStats::default(),
                viewer: ViewerState::default(),
            },
            PostBody::Text(TextBody {
                text: "hello".to_string(),
                author_avatar: None,
            }),
        )
    }

    async fn test_cache(memory_capacity: usize) -> TieredPostCache {
        let pool = ConnectionPool::from_memory().await.unwrap();
        let disk = SqlitePostStore::new(pool, 1024).await.unwrap();
        TieredPostCache::new(MemoryPostCache::new(memory_capacity), disk)
    }

    #[tokio::test]
    async fn test_exists_immediately_after_put() {
        let cache = test_cache(8).await;
        let post = sample_post(1);

        cache.put(&post).await.unwrap();

        assert!(cache.exists(&post.id()).await);
        assert_eq!(cache.get(&post.id()).await, Some(post));
    }

    #[tokio::test]
    async fn test_disk_survives_memory_eviction() {
        let cache = test_cache(1).await;
        let a = sample_post(1);
        let b = sample_post(2);

        cache.put(&a).await.unwrap();
        cache.put(&b).await.unwrap();

        // a はメモリから追い出されているがディスクから読める
        assert!(!cache.memory.contains(&a.id()));
        assert_eq!(cache.get(&a.id()).await, Some(a.clone()));
        // 読み出しでホット層へ昇格している
        assert!(cache.memory.contains(&a.id()));
    }

    #[tokio::test]
    async fn test_get_many_preserves_order() {
        let cache = test_cache(8).await;
        let a = sample_post(1);
        let b = sample_post(2);
        let missing = VersionedId::new(Uuid::new_v4(), 3);

        cache.put(&a).await.unwrap();
        cache.put(&b).await.unwrap();

        let results = cache.get_many(&[b.id(), missing, a.id()]).await;
        assert_eq!(results, vec![Some(b), None, Some(a)]);
    }

    #[tokio::test]
    async fn test_clear_empties_both_tiers() {
        let cache = test_cache(8).await;
        let post = sample_post(1);
        cache.put(&post).await.unwrap();

        cache.clear().await.unwrap();

        assert!(!cache.exists(&post.id()).await);
        assert!(cache.memory.is_empty());
        assert_eq!(cache.disk.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_disk_write_failure_keeps_memory_entry() {
        let pool = ConnectionPool::from_memory().await.unwrap();
        let disk = SqlitePostStore::new(pool.clone(), 16).await.unwrap();
        let cache = TieredPostCache::new(MemoryPostCache::new(8), disk);

        // ディスク側を閉じて書き込みを失敗させる
        pool.close().await;

        let post = sample_post(1);
        match cache.put(&post).await {
            Err(AppError::CacheWrite(_)) => {}
            other => panic!("expected cache write error, got {other:?}"),
        }

        // メモリ層は巻き戻されない
        assert_eq!(cache.memory.get(&post.id()), Some(post));
    }
}
