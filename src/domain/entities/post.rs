use super::user::AuthorRef;
use crate::domain::value_objects::{ContentBlob, VersionedId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ハイドレーション済みの投稿
///
/// 識別子はメタデータの中に一度だけ保持する。これにより
/// 「本体の ID とメタデータの ID が常に一致する」ことが構造的に保証される。
/// 同じ VersionedId に対して一度だけ生成され、以後は不変。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub metadata: PostMetadata,
    pub body: PostBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostMetadata {
    pub id: VersionedId,
    pub author: AuthorRef,
    pub created_at: DateTime<Utc>,
    pub state: PostState,
    pub kind: String,
    pub stats: InteractionStats,
    pub viewer: ViewerState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PostState {
    #[default]
    Active,
    Hidden,
    Deleted,
    #[serde(other)]
    Unknown,
}

/// インタラクション集計（サーバ側の合算値）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InteractionStats {
    pub like_count: u32,
    pub comment_count: u32,
}

/// 閲覧ユーザー自身のインタラクション状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ViewerState {
    pub liked: bool,
}

/// 投稿バリアントの閉じた直和型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum PostBody {
    Image(ImageBody),
    Comment(CommentBody),
    Text(TextBody),
    Unrecognized(UnrecognizedBody),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBody {
    pub caption: String,
    pub image: ContentBlob,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentBody {
    pub parent: VersionedId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBody {
    pub text: String,
    /// avatar_url があればハイドレーション時に取得される
    pub author_avatar: Option<ContentBlob>,
}

/// 未知の kind のレコード。メタデータだけ保持してフィードに残す
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnrecognizedBody {
    pub raw_kind: String,
}

impl Post {
    pub fn new(metadata: PostMetadata, body: PostBody) -> Self {
        Self { metadata, body }
    }

    pub fn id(&self) -> VersionedId {
        self.metadata.id
    }

    pub fn cache_key(&self) -> String {
        self.metadata.id.cache_key()
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.body, PostBody::Comment(_))
    }
}
