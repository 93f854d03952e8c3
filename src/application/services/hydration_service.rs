use crate::application::ports::{ContentFetcher, PostCache};
use crate::domain::entities::{
    CommentBody, ImageBody, Post, PostBody, RawFeedRecord, RecordPayload, TextBody,
    UnrecognizedBody,
};
use crate::shared::error::AppError;
use std::sync::Arc;
use tracing::{debug, warn};

/// 生レコードをキャッシュ済みの型付き投稿へ変換するサービス
///
/// バージョン付き識別子でキャッシュを引き、ヒットすれば即返す。
/// 同じ識別子の内容は不変なので、一度ハイドレートした投稿を
/// 再フェッチすることはない。
pub struct HydrationService {
    cache: Arc<dyn PostCache>,
    fetcher: Arc<dyn ContentFetcher>,
}

impl HydrationService {
    pub fn new(cache: Arc<dyn PostCache>, fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self { cache, fetcher }
    }

    /// 1 レコードをハイドレートする
    ///
    /// 失敗はそのレコードに閉じる。呼び出し側（トラバーサルループ）が
    /// ログしてスキップし、後続レコードの処理は続く。
    pub async fn hydrate(&self, record: &RawFeedRecord) -> Result<Post, AppError> {
        let metadata = record.metadata()?;
        let id = metadata.id;

        if let Some(post) = self.cache.get(&id).await {
            debug!("Cache hit for {id}");
            return Ok(post);
        }

        let body = match record.parsed_payload()? {
            RecordPayload::Image { image_url, caption } => {
                let image = self.fetcher.fetch(&image_url).await?;
                PostBody::Image(ImageBody { caption, image })
            }
            RecordPayload::Comment { parent, text } => {
                PostBody::Comment(CommentBody { parent, text })
            }
            RecordPayload::Text { text } => {
                let author_avatar = match &metadata.author.avatar_url {
                    Some(url) => Some(self.fetcher.fetch(url).await?),
                    None => None,
                };
                PostBody::Text(TextBody {
                    text,
                    author_avatar,
                })
            }
            RecordPayload::Unrecognized { raw_kind } => {
                PostBody::Unrecognized(UnrecognizedBody { raw_kind })
            }
        };

        let post = Post::new(metadata, body);

        // 書き込み失敗はソフトエラー。ハイドレート結果自体は返す
        if let Err(e) = self.cache.put(&post).await {
            warn!("Cache write failed for {id}: {e}");
        }

        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{ContentBlob, VersionedId};
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::RwLock;
    use uuid::Uuid;

    struct TestCache {
        entries: RwLock<HashMap<String, Post>>,
    }

    impl TestCache {
        fn new() -> Self {
            Self {
                entries: RwLock::new(HashMap::new()),
            }
        }

        async fn len(&self) -> usize {
            self.entries.read().await.len()
        }
    }

    #[async_trait]
    impl PostCache for TestCache {
        async fn exists(&self, id: &VersionedId) -> bool {
            self.entries.read().await.contains_key(&id.cache_key())
        }

        async fn get(&self, id: &VersionedId) -> Option<Post> {
            self.entries.read().await.get(&id.cache_key()).cloned()
        }

        async fn put(&self, post: &Post) -> Result<(), AppError> {
            self.entries
                .write()
                .await
                .insert(post.cache_key(), post.clone());
            Ok(())
        }

        async fn get_many(&self, ids: &[VersionedId]) -> Vec<Option<Post>> {
            let entries = self.entries.read().await;
            ids.iter()
                .map(|id| entries.get(&id.cache_key()).cloned())
                .collect()
        }

        async fn clear(&self) -> Result<(), AppError> {
            self.entries.write().await.clear();
            Ok(())
        }
    }

    struct CountingFetcher {
        calls: AtomicUsize,
    }

    impl CountingFetcher {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ContentFetcher for CountingFetcher {
        async fn fetch(&self, url: &str) -> Result<ContentBlob, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ContentBlob::new(
                Bytes::from_static(b"image-bytes"),
                "image/png".to_string(),
                Some(url.to_string()),
            ))
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl ContentFetcher for FailingFetcher {
        async fn fetch(&self, url: &str) -> Result<ContentBlob, AppError> {
            Err(AppError::ContentFetch(format!("unreachable: {url}")))
        }
    }

    fn image_record(seq: u32) -> RawFeedRecord {
        serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4().to_string(),
            "updated_at": 1_700_000_000_000i64 + i64::from(seq),
            "author": { "id": Uuid::new_v4().to_string(), "handle": format!("user{seq}") },
            "created_at": 1_699_999_000_000i64,
            "type": "image",
            "payload": {
                "image_url": format!("https://cdn.example.com/{seq}.png"),
                "caption": format!("caption {seq}")
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_cold_cache_hydration_writes_one_entry_per_record() {
        let cache = Arc::new(TestCache::new());
        let fetcher = Arc::new(CountingFetcher::new());
        let service = HydrationService::new(cache.clone(), fetcher.clone());

        let records: Vec<_> = (0..5).map(image_record).collect();
        for record in &records {
            service.hydrate(record).await.unwrap();
        }

        assert_eq!(cache.len().await, 5);
        for record in &records {
            assert!(cache.exists(&record.identifier().unwrap()).await);
        }
    }

    #[tokio::test]
    async fn test_second_hydration_is_cache_hit_with_no_fetch() {
        let cache = Arc::new(TestCache::new());
        let fetcher = Arc::new(CountingFetcher::new());
        let service = HydrationService::new(cache.clone(), fetcher.clone());

        let record = image_record(1);
        let first = service.hydrate(&record).await.unwrap();
        assert_eq!(fetcher.call_count(), 1);

        let second = service.hydrate(&record).await.unwrap();
        assert_eq!(fetcher.call_count(), 1, "cache hit must not re-fetch");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_malformed_identifier_is_parsing_error() {
        let cache = Arc::new(TestCache::new());
        let service = HydrationService::new(cache.clone(), Arc::new(CountingFetcher::new()));

        let mut record = image_record(1);
        record.id = "broken".to_string();

        match service.hydrate(&record).await {
            Err(AppError::Parsing(_)) => {}
            other => panic!("expected parsing error, got {other:?}"),
        }
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_no_cache_entry() {
        let cache = Arc::new(TestCache::new());
        let service = HydrationService::new(cache.clone(), Arc::new(FailingFetcher));

        let record = image_record(1);
        match service.hydrate(&record).await {
            Err(AppError::ContentFetch(_)) => {}
            other => panic!("expected fetch error, got {other:?}"),
        }
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_comment_hydration_fetches_nothing() {
        let cache = Arc::new(TestCache::new());
        let fetcher = Arc::new(CountingFetcher::new());
        let service = HydrationService::new(cache.clone(), fetcher.clone());

        let mut record = image_record(1);
        record.kind = "comment".to_string();
        record.payload = serde_json::json!({
            "parent_id": Uuid::new_v4().to_string(),
            "parent_updated_at": 7i64,
            "text": "reply"
        });

        let post = service.hydrate(&record).await.unwrap();
        assert!(post.is_comment());
        assert_eq!(fetcher.call_count(), 0);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_kind_hydrates_to_unrecognized() {
        let cache = Arc::new(TestCache::new());
        let fetcher = Arc::new(CountingFetcher::new());
        let service = HydrationService::new(cache.clone(), fetcher.clone());

        let mut record = image_record(1);
        record.kind = "poll".to_string();
        record.payload = serde_json::json!({ "options": ["a", "b"] });

        let post = service.hydrate(&record).await.unwrap();
        match &post.body {
            PostBody::Unrecognized(body) => assert_eq!(body.raw_kind, "poll"),
            other => panic!("expected unrecognized body, got {other:?}"),
        }
        assert_eq!(fetcher.call_count(), 0);
    }
}
