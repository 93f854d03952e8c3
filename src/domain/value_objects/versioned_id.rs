use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// エンティティの 1 バージョンを一意に指す複合キー
///
/// エンティティ ID と更新タイムスタンプ（エポックミリ秒）の組。
/// 同じ ID でもバージョンが違えば別のキャッシュエントリになる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionedId {
    pub entity_id: Uuid,
    pub version: i64,
}

impl VersionedId {
    pub fn new(entity_id: Uuid, version: i64) -> Self {
        Self { entity_id, version }
    }

    /// ワイヤ上の文字列 ID とタイムスタンプから組み立てる
    pub fn parse(entity_id: &str, version: i64) -> Result<Self, String> {
        let entity_id = Uuid::parse_str(entity_id.trim())
            .map_err(|e| format!("Invalid entity id '{entity_id}': {e}"))?;
        if version < 0 {
            return Err(format!("Invalid version timestamp: {version}"));
        }
        Ok(Self { entity_id, version })
    }

    /// キャッシュ検索に使う導出キー
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.entity_id, self.version)
    }

    /// cache_key() の逆変換
    pub fn parse_key(key: &str) -> Result<Self, String> {
        let (id, version) = key
            .rsplit_once(':')
            .ok_or_else(|| format!("Invalid cache key: {key}"))?;
        let version = version
            .parse::<i64>()
            .map_err(|e| format!("Invalid version in cache key '{key}': {e}"))?;
        Self::parse(id, version)
    }
}

impl fmt::Display for VersionedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cache_key())
    }
}
