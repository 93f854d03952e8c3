use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub stream: StreamConfig,
    pub cache: CacheConfig,
    pub fetch: FetchConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// キューのソフト上限（プロデューサをブロックしない）
    pub queue_capacity: usize,
    /// 占有数がここまで下がったら次ページを要求する
    pub low_water_mark: usize,
    /// 1ページあたりのレコード数（サーバへのヒント）
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub memory_capacity: usize,
    /// ディスク層の行数上限。超過分は挿入の古い順に削除される
    pub max_disk_entries: u32,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stream: StreamConfig {
                queue_capacity: 64,
                low_water_mark: 8,
                page_size: 20,
            },
            cache: CacheConfig {
                memory_capacity: 512,
                max_disk_entries: 10_000,
                max_connections: 5,
            },
            fetch: FetchConfig {
                timeout_secs: 10,
                user_agent: "nagare/0.1.0".to_string(),
            },
            storage: StorageConfig {
                data_dir: default_data_dir(),
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        // 既定値
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("NAGARE_QUEUE_CAPACITY") {
            if let Some(value) = parse_usize(&v) {
                cfg.stream.queue_capacity = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("NAGARE_LOW_WATER_MARK") {
            if let Some(value) = parse_usize(&v) {
                cfg.stream.low_water_mark = value;
            }
        }
        if let Ok(v) = std::env::var("NAGARE_PAGE_SIZE") {
            if let Some(value) = parse_u32(&v) {
                cfg.stream.page_size = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("NAGARE_MEMORY_CACHE_CAPACITY") {
            if let Some(value) = parse_usize(&v) {
                cfg.cache.memory_capacity = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("NAGARE_MAX_DISK_ENTRIES") {
            if let Some(value) = parse_u32(&v) {
                cfg.cache.max_disk_entries = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("NAGARE_FETCH_TIMEOUT_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.fetch.timeout_secs = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("NAGARE_USER_AGENT") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                cfg.fetch.user_agent = trimmed.to_string();
            }
        }
        if let Ok(v) = std::env::var("NAGARE_DATA_DIR") {
            let trimmed = v.trim();
            if !trimmed.is_empty() {
                cfg.storage.data_dir = trimmed.to_string();
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.stream.queue_capacity == 0 {
            return Err("Stream queue_capacity must be greater than 0".to_string());
        }
        if self.stream.low_water_mark >= self.stream.queue_capacity {
            return Err("Stream low_water_mark must be below queue_capacity".to_string());
        }
        if self.stream.page_size == 0 {
            return Err("Stream page_size must be greater than 0".to_string());
        }
        if self.cache.memory_capacity == 0 {
            return Err("Cache memory_capacity must be greater than 0".to_string());
        }
        if self.cache.max_disk_entries == 0 {
            return Err("Cache max_disk_entries must be greater than 0".to_string());
        }
        if self.cache.max_connections == 0 {
            return Err("Cache max_connections must be greater than 0".to_string());
        }
        Ok(())
    }

    /// ディスクキャッシュの既定パス
    pub fn database_url(&self) -> String {
        format!("sqlite://{}/nagare_cache.db?mode=rwc", self.storage.data_dir)
    }
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|dir| dir.join("nagare").to_string_lossy().into_owned())
        .unwrap_or_else(|| "./data".to_string())
}

fn parse_usize(value: &str) -> Option<usize> {
    value.trim().parse::<usize>().ok()
}

fn parse_u32(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
