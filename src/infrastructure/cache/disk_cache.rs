use crate::domain::entities::Post;
use crate::domain::value_objects::VersionedId;
use crate::infrastructure::database::ConnectionPool;
use crate::shared::error::AppError;
use chrono::Utc;
use sqlx::Row;
use tracing::warn;

/// ディスク層（真正のサブセット）
///
/// シリアライズ済み投稿を VersionedId の導出キーで保存する。
/// 行数上限を超えた分は挿入の古い順に削除される。
pub struct SqlitePostStore {
    pool: ConnectionPool,
    max_entries: u32,
}

impl SqlitePostStore {
    pub async fn new(pool: ConnectionPool, max_entries: u32) -> Result<Self, AppError> {
        let store = Self { pool, max_entries };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS post_cache (
                cache_key TEXT PRIMARY KEY,
                payload TEXT NOT NULL,
                inserted_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(self.pool.get_pool())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_post_cache_inserted_at ON post_cache (inserted_at)",
        )
        .execute(self.pool.get_pool())
        .await?;

        Ok(())
    }

    /// ペイロードをデシリアライズせずに存在確認する
    pub async fn exists(&self, id: &VersionedId) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 FROM post_cache WHERE cache_key = ?1 LIMIT 1")
            .bind(id.cache_key())
            .fetch_optional(self.pool.get_pool())
            .await?;
        Ok(row.is_some())
    }

    /// 読み出し。壊れたエントリは欠損として扱う（ログのみ）
    pub async fn get(&self, id: &VersionedId) -> Result<Option<Post>, AppError> {
        let row = sqlx::query("SELECT payload FROM post_cache WHERE cache_key = ?1")
            .bind(id.cache_key())
            .fetch_optional(self.pool.get_pool())
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row.get("payload");
        match serde_json::from_str::<Post>(&payload) {
            Ok(post) => Ok(Some(post)),
            Err(e) => {
                warn!("Corrupted cache entry for {id}, treating as absent: {e}");
                Ok(None)
            }
        }
    }

    pub async fn put(&self, post: &Post) -> Result<(), AppError> {
        let payload = serde_json::to_string(post)?;
        let inserted_at = Utc::now().timestamp_millis();

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO post_cache (cache_key, payload, inserted_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(post.cache_key())
        .bind(&payload)
        .bind(inserted_at)
        .execute(self.pool.get_pool())
        .await?;

        self.prune().await?;
        Ok(())
    }

    /// 行数上限を超えた分を挿入の古い順に削除する
    async fn prune(&self) -> Result<(), AppError> {
        sqlx::query(
            r#"
            DELETE FROM post_cache WHERE cache_key NOT IN (
                SELECT cache_key FROM post_cache
                ORDER BY inserted_at DESC, rowid DESC
                LIMIT ?1
            )
            "#,
        )
        .bind(i64::from(self.max_entries))
        .execute(self.pool.get_pool())
        .await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM post_cache")
            .execute(self.pool.get_pool())
            .await?;
        Ok(())
    }

    pub async fn len(&self) -> Result<u64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM post_cache")
            .fetch_one(self.pool.get_pool())
            .await?;
        let count: i64 = row.get("count");
        Ok(count as u64)
    }
}
