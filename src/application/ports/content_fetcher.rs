use crate::domain::value_objects::ContentBlob;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// URL 参照をバイト列に解決する外部境界（ネットワーク GET）
///
/// リトライポリシーを持つならこの実装側の責務。ハイドレータは再試行しない。
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ContentBlob, AppError>;
}
