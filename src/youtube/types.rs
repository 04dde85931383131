use serde::{Deserialize, Serialize};

/// 正規化済みコメント
///
/// 旧スキーマ（インラインレンダラー）と新スキーマ（参照キー + ミューテーション）の
/// どちらから解決しても同じ形になる。元ページへの参照は持たない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>, // → commentId
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>, // → authorName
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_avatar: Option<String>, // → authorAvatar
    #[serde(default)]
    pub text: String,
}
