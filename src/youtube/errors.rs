use thiserror::Error;

/// コメント取得エラー
///
/// 転送層の失敗のみがエラーとして呼び出し元に届く。
/// コメント欄なし・ミューテーション欠落・アイテム欠落は正常系として扱う。
#[derive(Error, Debug)]
pub enum CommentFeedError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    #[error("Request timeout: no response from InnerTube")]
    Timeout,
}
