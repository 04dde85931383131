//! InnerTube API 固有の型定義
//!
//! ページ全体は`serde_json::Value`のまま扱い、アイテム単位でのみ型付けする。
//! 全フィールドを`Option`にしているため、欠落フィールドや型の合わないフィールドは
//! `None`になり、アイテム全体の解釈は失敗しない。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::{INNERTUBE_API_KEY, INNERTUBE_CLIENT_NAME, INNERTUBE_CLIENT_VERSION};

/// 呼び出し元アプリケーションの識別情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub api_key: String,
    pub client_name: String,
    pub client_version: String,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            api_key: INNERTUBE_API_KEY.to_string(),
            client_name: INNERTUBE_CLIENT_NAME.to_string(),
            client_version: INNERTUBE_CLIENT_VERSION.to_string(),
        }
    }
}

impl SessionContext {
    /// `X-Youtube-Client-Name`ヘッダーに送る数値ID
    ///
    /// 対応表にないクライアント名は`None`（ヘッダーを付けない）
    pub fn client_name_id(&self) -> Option<&'static str> {
        match self.client_name.as_str() {
            "WEB" => Some("1"),
            "MWEB" => Some("2"),
            "ANDROID" => Some("3"),
            "IOS" => Some("5"),
            "TVHTML5" => Some("7"),
            "WEB_EMBEDDED_PLAYER" => Some("56"),
            "WEB_REMIX" => Some("67"),
            _ => None,
        }
    }
}

/// continuationリクエストのボディ
#[derive(Debug, Serialize)]
pub struct NextRequest<'a> {
    pub context: RequestContext<'a>,
    pub continuation: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RequestContext<'a> {
    pub client: RequestClient<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestClient<'a> {
    pub client_name: &'a str,
    pub client_version: &'a str,
}

impl<'a> NextRequest<'a> {
    pub fn new(session: &'a SessionContext, continuation: &'a str) -> Self {
        Self {
            context: RequestContext {
                client: RequestClient {
                    client_name: &session.client_name,
                    client_version: &session.client_version,
                },
            },
            continuation,
        }
    }
}

/// 型が合わない値は`None`として扱う
///
/// フィールド1つの型違いでアイテム全体が落ちないよう、葉ごとに吸収する
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// 配列以外は`None`、配列内の解釈できない要素は読み飛ばす
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| T::deserialize(item).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

/// continuationItems配列の要素
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuationItem {
    #[serde(default, deserialize_with = "lenient")]
    pub comment_thread_renderer: Option<CommentThreadRenderer>,
    #[serde(default, deserialize_with = "lenient")]
    pub continuation_item_renderer: Option<ContinuationItemRenderer>,
}

/// コメントスレッド（旧スキーマ: `comment`、新スキーマ: `commentViewModel`）
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadRenderer {
    #[serde(default, deserialize_with = "lenient")]
    pub comment: Option<CommentContainer>,
    #[serde(default, deserialize_with = "lenient")]
    pub comment_view_model: Option<CommentViewModelContainer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentContainer {
    #[serde(default, deserialize_with = "lenient")]
    pub comment_renderer: Option<CommentRenderer>,
}

/// 旧スキーマのインラインレンダラー
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRenderer {
    #[serde(default, deserialize_with = "lenient")]
    pub comment_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub author_text: Option<SimpleText>,
    #[serde(default, deserialize_with = "lenient")]
    pub author_thumbnail: Option<ThumbnailContainer>,
    #[serde(default, deserialize_with = "lenient")]
    pub content_text: Option<RunsText>,
}

impl CommentRenderer {
    /// runs配列のテキストを区切りなしで連結（runsがなければ空文字）
    pub fn plain_text(&self) -> String {
        self.content_text
            .as_ref()
            .and_then(|t| t.runs.as_ref())
            .map(|runs| {
                runs.iter()
                    .filter_map(|r| r.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    pub fn author_avatar(&self) -> Option<String> {
        self.author_thumbnail
            .as_ref()?
            .thumbnails
            .as_ref()?
            .first()?
            .url
            .clone()
    }
}

/// `commentViewModel`は入れ子（`commentViewModel.commentViewModel`）の場合と
/// 直下にキーを持つ場合がある
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentViewModelContainer {
    #[serde(default, deserialize_with = "lenient")]
    pub comment_view_model: Option<CommentViewModel>,
    #[serde(default, deserialize_with = "lenient")]
    pub comment_key: Option<String>,
}

impl CommentViewModelContainer {
    pub fn comment_key(&self) -> Option<&str> {
        match &self.comment_view_model {
            Some(inner) => inner.comment_key.as_deref(),
            None => self.comment_key.as_deref(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentViewModel {
    #[serde(default, deserialize_with = "lenient")]
    pub comment_key: Option<String>,
}

/// シンプルテキスト
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleText {
    #[serde(default, deserialize_with = "lenient")]
    pub simple_text: Option<String>,
}

/// runs形式のリッチテキスト
#[derive(Debug, Default, Deserialize)]
pub struct RunsText {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub runs: Option<Vec<RunItem>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RunItem {
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
}

/// サムネイルコンテナ
#[derive(Debug, Default, Deserialize)]
pub struct ThumbnailContainer {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub thumbnails: Option<Vec<Thumbnail>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Thumbnail {
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
}

/// 次ページ用トークンを持つ番兵アイテム
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuationItemRenderer {
    #[serde(default, deserialize_with = "lenient")]
    pub continuation_endpoint: Option<ContinuationEndpoint>,
}

impl ContinuationItemRenderer {
    pub fn token(&self) -> Option<&str> {
        self.continuation_endpoint
            .as_ref()?
            .continuation_command
            .as_ref()?
            .token
            .as_deref()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuationEndpoint {
    #[serde(default, deserialize_with = "lenient")]
    pub continuation_command: Option<ContinuationCommand>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContinuationCommand {
    #[serde(default, deserialize_with = "lenient")]
    pub token: Option<String>,
}

/// `frameworkUpdates.entityBatchUpdate.mutations`の要素
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutation {
    #[serde(default, deserialize_with = "lenient")]
    pub entity_key: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub payload: Option<MutationPayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub comment_entity_payload: Option<CommentEntityPayload>,
}

/// 新スキーマのコメント本体
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentEntityPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub properties: Option<CommentProperties>,
    #[serde(default, deserialize_with = "lenient")]
    pub author: Option<CommentAuthor>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentProperties {
    #[serde(default, deserialize_with = "lenient")]
    pub comment_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<CommentContent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentContent {
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    #[serde(default, deserialize_with = "lenient")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub avatar_thumbnail_url: Option<String>,
}
