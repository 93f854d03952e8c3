use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 投稿の作成者への参照
///
/// フィードレコードに埋め込まれてくる最小限のプロフィール。完全な
/// ユーザーエンティティはこのサブシステムの関心外。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: Uuid,
    pub handle: String,
    pub avatar_url: Option<String>,
}

impl AuthorRef {
    pub fn new(id: Uuid, handle: String) -> Self {
        Self {
            id,
            handle,
            avatar_url: None,
        }
    }

    pub fn with_avatar(mut self, avatar_url: String) -> Self {
        self.avatar_url = Some(avatar_url);
        self
    }
}
