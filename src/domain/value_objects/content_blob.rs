use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// 取得済みコンテンツの不変バリューオブジェクト
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlob {
    pub data: Bytes,
    pub content_type: String,
    pub source_url: Option<String>,
}

impl ContentBlob {
    pub fn new(data: Bytes, content_type: String, source_url: Option<String>) -> Self {
        Self {
            data,
            content_type,
            source_url,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_equality() {
        let a = ContentBlob::new(
            Bytes::from_static(b"abc"),
            "image/png".to_string(),
            Some("https://example.com/a.png".to_string()),
        );
        let b = ContentBlob::new(
            Bytes::from_static(b"abc"),
            "image/png".to_string(),
            Some("https://example.com/a.png".to_string()),
        );
        assert_eq!(a, b);
    }
}
