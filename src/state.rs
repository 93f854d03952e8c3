use crate::application::ports::{ContentFetcher, FeedTransport, PostCache};
use crate::application::services::{FeedService, HydrationService};
use crate::infrastructure::cache::{MemoryPostCache, SqlitePostStore, TieredPostCache};
use crate::infrastructure::database::ConnectionPool;
use crate::infrastructure::fetch::HttpContentFetcher;
use crate::shared::{AppConfig, AppError};
use std::sync::Arc;
use tracing::info;

/// セッション単位のサービス束
///
/// ログイン時に構築され、キャッシュ・フェッチャ・トランスポートを
/// 各サービスへ注入する。シングルトンは作らない。
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub cache: Arc<dyn PostCache>,
    pub hydrator: Arc<HydrationService>,
    transport: Arc<dyn FeedTransport>,
}

impl AppState {
    pub async fn new(
        config: AppConfig,
        transport: Arc<dyn FeedTransport>,
    ) -> anyhow::Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid config: {e}"))?;

        std::fs::create_dir_all(&config.storage.data_dir)?;

        let pool =
            ConnectionPool::new(&config.database_url(), config.cache.max_connections).await?;
        let disk = SqlitePostStore::new(pool, config.cache.max_disk_entries).await?;
        let memory = MemoryPostCache::new(config.cache.memory_capacity);
        let cache: Arc<dyn PostCache> = Arc::new(TieredPostCache::new(memory, disk));

        let fetcher: Arc<dyn ContentFetcher> = Arc::new(HttpContentFetcher::new(&config.fetch)?);
        let hydrator = Arc::new(HydrationService::new(cache.clone(), fetcher));

        info!("Session state initialized");

        Ok(Self {
            config,
            cache,
            hydrator,
            transport,
        })
    }

    /// フィードのトラバーサルを開始するサービスを組み立てる
    pub fn feed_service(&self) -> FeedService {
        FeedService::new(
            self.transport.clone(),
            self.hydrator.clone(),
            self.config.stream.clone(),
        )
    }

    /// ログアウト・アカウント切替。キャッシュを両層とも丸ごと消す
    pub async fn logout(&self) -> Result<(), AppError> {
        info!("Clearing post cache on logout");
        self.cache.clear().await
    }
}
