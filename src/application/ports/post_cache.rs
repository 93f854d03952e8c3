use crate::domain::entities::Post;
use crate::domain::value_objects::VersionedId;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// ハイドレーション済み投稿のキャッシュポート
///
/// プロセス全体で共有され、同時に走る複数トラバーサルから使われる。
/// ライフサイクルはセッションに束ねる（ログイン時に構築、ログアウトで clear）。
#[async_trait]
pub trait PostCache: Send + Sync {
    /// ペイロードをデシリアライズせずに存在確認する
    async fn exists(&self, id: &VersionedId) -> bool;

    /// キャッシュを検索。壊れたエントリは欠損として扱う
    async fn get(&self, id: &VersionedId) -> Option<Post>;

    /// 書き込み。ディスク書き込み失敗はソフトエラー（メモリは巻き戻さない）
    async fn put(&self, post: &Post) -> Result<(), AppError>;

    /// 順序を保った一括読み出し
    async fn get_many(&self, ids: &[VersionedId]) -> Vec<Option<Post>>;

    /// 両層を空にする（ログアウト・アカウント切替時）
    async fn clear(&self) -> Result<(), AppError>;
}
