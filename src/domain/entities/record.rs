use super::post::{InteractionStats, PostMetadata, PostState, ViewerState};
use super::user::AuthorRef;
use crate::domain::value_objects::VersionedId;
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ストリーミング RPC から届く生のフィードレコード
///
/// ID やタイムスタンプはワイヤ上では文字列/ミリ秒のまま。型付けは
/// `identifier()` / `metadata()` / `parsed_payload()` で行い、失敗は
/// `AppError::Parsing` としてそのレコードだけを落とす。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFeedRecord {
    pub id: String,
    pub updated_at: i64,
    pub author: RawAuthor,
    pub created_at: i64,
    #[serde(default)]
    pub state: PostState,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub stats: InteractionStats,
    #[serde(default)]
    pub viewer: ViewerState,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAuthor {
    pub id: String,
    pub handle: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// kind で判別されたペイロード
#[derive(Debug, Clone, PartialEq)]
pub enum RecordPayload {
    Image { image_url: String, caption: String },
    Comment { parent: VersionedId, text: String },
    Text { text: String },
    Unrecognized { raw_kind: String },
}

#[derive(Debug, Deserialize)]
struct ImagePayload {
    image_url: String,
    #[serde(default)]
    caption: String,
}

#[derive(Debug, Deserialize)]
struct CommentPayload {
    parent_id: String,
    parent_updated_at: i64,
    text: String,
}

#[derive(Debug, Deserialize)]
struct TextPayload {
    text: String,
}

impl RawFeedRecord {
    /// レコードのバージョン付き識別子
    pub fn identifier(&self) -> Result<VersionedId, AppError> {
        VersionedId::parse(&self.id, self.updated_at).map_err(AppError::Parsing)
    }

    /// 型付きメタデータへ変換する
    pub fn metadata(&self) -> Result<PostMetadata, AppError> {
        let id = self.identifier()?;
        let author_id = Uuid::parse_str(self.author.id.trim())
            .map_err(|e| AppError::Parsing(format!("Invalid author id '{}': {e}", self.author.id)))?;
        let created_at = timestamp_millis(self.created_at)
            .ok_or_else(|| AppError::Parsing(format!("Invalid created_at: {}", self.created_at)))?;

        let mut author = AuthorRef::new(author_id, self.author.handle.clone());
        if let Some(url) = &self.author.avatar_url {
            author = author.with_avatar(url.clone());
        }

        Ok(PostMetadata {
            id,
            author,
            created_at,
            state: self.state,
            kind: self.kind.clone(),
            stats: self.stats,
            viewer: self.viewer,
        })
    }

    /// kind タグでペイロードを判別する
    ///
    /// 未知の kind はエラーではなく Unrecognized として残す。
    pub fn parsed_payload(&self) -> Result<RecordPayload, AppError> {
        match self.kind.as_str() {
            "image" => {
                let payload: ImagePayload = serde_json::from_value(self.payload.clone())
                    .map_err(|e| AppError::Parsing(format!("Bad image payload: {e}")))?;
                Ok(RecordPayload::Image {
                    image_url: payload.image_url,
                    caption: payload.caption,
                })
            }
            "comment" => {
                let payload: CommentPayload = serde_json::from_value(self.payload.clone())
                    .map_err(|e| AppError::Parsing(format!("Bad comment payload: {e}")))?;
                let parent = VersionedId::parse(&payload.parent_id, payload.parent_updated_at)
                    .map_err(AppError::Parsing)?;
                Ok(RecordPayload::Comment {
                    parent,
                    text: payload.text,
                })
            }
            "post" => {
                let payload: TextPayload = serde_json::from_value(self.payload.clone())
                    .map_err(|e| AppError::Parsing(format!("Bad post payload: {e}")))?;
                Ok(RecordPayload::Text { text: payload.text })
            }
            other => Ok(RecordPayload::Unrecognized {
                raw_kind: other.to_string(),
            }),
        }
    }
}

fn timestamp_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
}
