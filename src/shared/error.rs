use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Malformed feed record: {0}")]
    Parsing(String),

    #[error("Content fetch failed: {0}")]
    ContentFetch(String),

    #[error("Cache read failed: {0}")]
    CacheRead(String),

    #[error("Cache write failed: {0}")]
    CacheWrite(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// レコード単位で抑制できるエラーかどうか
    ///
    /// Parsing / ContentFetch / キャッシュ系はそのレコードを落とすだけで
    /// トラバーサルは継続する。Transport のみストリームを終わらせる。
    pub fn is_record_scoped(&self) -> bool {
        matches!(
            self,
            AppError::Parsing(_)
                | AppError::ContentFetch(_)
                | AppError::CacheRead(_)
                | AppError::CacheWrite(_)
        )
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ContentFetch(err.to_string())
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::Parsing(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Internal(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
