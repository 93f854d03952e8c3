use super::versioned_id::VersionedId;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// ストリーム開始時にサーバへ渡すフィード選択
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum FeedFilter {
    /// 全体フィード
    Global,
    /// フォロー中ユーザーのフィード
    Following,
    /// 特定ユーザーの投稿
    User { user_id: Uuid },
    /// 親投稿に対するコメントフィード
    Comments { parent: VersionedId },
}

impl fmt::Display for FeedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedFilter::Global => write!(f, "global"),
            FeedFilter::Following => write!(f, "following"),
            FeedFilter::User { user_id } => write!(f, "user:{user_id}"),
            FeedFilter::Comments { parent } => write!(f, "comments:{parent}"),
        }
    }
}
