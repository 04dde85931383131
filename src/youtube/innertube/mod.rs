//! InnerTube API クライアントモジュール
//!
//! YouTubeの内部APIを使用して動画のコメントスレッドを取得する。
//! 公式API Data v3と異なり、ユーザーのAPIキー不要でクォータ制限なし。
//!
//! ## 注意事項
//! - 非公式APIのため、仕様変更のリスクあり
//! - レスポンスは旧スキーマ（インラインレンダラー）と
//!   新スキーマ（commentKey + entityBatchUpdate）が混在する

pub mod client;
pub mod mutations;
pub mod parser;
pub mod types;

pub use client::{CommentTransport, InnerTubeClient};
pub use mutations::MutationIndex;
pub use parser::{extract_page_items, locate_comments_token, reconcile_item, ResolvedItem};
pub use types::SessionContext;
