//! InnerTube API クライアント実装
//!
//! 動画ページ取得（GET）とcontinuation取得（POST）の2つの呼び出しのみを行う。
//! リトライ・バックオフはしない。失敗はそのまま呼び出し元に返す。

use reqwest::{Client, Url};
use serde_json::Value;
use std::future::Future;

use super::types::{NextRequest, SessionContext};
use crate::config::YOUTUBE_BASE_URL;
use crate::util::mask_secret;
use crate::youtube::errors::CommentFeedError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// ページ取得の抽象
///
/// ページネーションループはこのトレイト越しに通信する。
/// テストではメモリ上の偽実装に差し替える。
pub trait CommentTransport {
    /// 動画ページ（構造化JSON版）を取得
    fn fetch_initial_page(
        &self,
        video_id: &str,
    ) -> impl Future<Output = Result<Value, CommentFeedError>> + Send;

    /// continuationトークンで次のコメントページを取得
    fn fetch_continuation_page(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Value, CommentFeedError>> + Send;
}

/// InnerTube APIクライアント
#[derive(Clone)]
pub struct InnerTubeClient {
    client: Client,
    base_url: Url,
    session: SessionContext,
}

impl InnerTubeClient {
    /// 新しいクライアントを作成
    ///
    /// # Errors
    /// HTTPクライアントのビルドに失敗した場合にエラーを返す
    pub fn new() -> Result<Self, CommentFeedError> {
        Self::with_base_url(YOUTUBE_BASE_URL)
    }

    /// 接続先を指定してクライアントを作成（モックサーバー向け）
    pub fn with_base_url(base_url: &str) -> Result<Self, CommentFeedError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CommentFeedError::NetworkError(format!("Failed to build HTTP client: {}", e)))?;
        Self::with_http_client(client, base_url)
    }

    /// 構築済みのHTTPクライアントを使う
    ///
    /// タイムアウト等は呼び出し側がここで設定する（エンジン自身は設けない）
    pub fn with_http_client(client: Client, base_url: &str) -> Result<Self, CommentFeedError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CommentFeedError::InvalidEndpoint(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CommentFeedError::InvalidEndpoint(base_url.to_string()));
        }

        Ok(Self {
            client,
            base_url,
            session: SessionContext::default(),
        })
    }

    /// セッションコンテキストを差し替える
    pub fn with_session(mut self, session: SessionContext) -> Self {
        self.session = session;
        self
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    fn endpoint(&self, path: &str) -> Result<Url, CommentFeedError> {
        self.base_url
            .join(path)
            .map_err(|e| CommentFeedError::InvalidEndpoint(format!("{}: {}", path, e)))
    }

    /// レスポンスのステータスを確認してJSONとして読む
    async fn read_json(response: reqwest::Response, label: &str) -> Result<Value, CommentFeedError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            log::error!("{} failed: {} - {}", label, status, message);
            return Err(CommentFeedError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await.map_err(map_send_error)?;
        serde_json::from_slice(&body)
            .map_err(|e| CommentFeedError::ParseError(format!("{} returned non-JSON body: {}", label, e)))
    }
}

/// 送信エラーを分類（タイムアウトは個別のバリアント）
fn map_send_error(e: reqwest::Error) -> CommentFeedError {
    if e.is_timeout() {
        log::warn!("InnerTube request timed out");
        CommentFeedError::Timeout
    } else {
        CommentFeedError::HttpError(e)
    }
}

impl CommentTransport for InnerTubeClient {
    async fn fetch_initial_page(&self, video_id: &str) -> Result<Value, CommentFeedError> {
        let url = self.endpoint("watch")?;
        log::info!("Fetching watch page for video: {}", video_id);

        let mut request = self
            .client
            .get(url)
            .query(&[("v", video_id), ("pbj", "1")])
            .header("X-Youtube-Client-Version", self.session.client_version.as_str());

        match self.session.client_name_id() {
            Some(id) => request = request.header("X-Youtube-Client-Name", id),
            None => log::debug!(
                "No numeric id for client name {}, omitting X-Youtube-Client-Name",
                self.session.client_name
            ),
        }

        let response = request.send().await.map_err(map_send_error)?;

        Self::read_json(response, "Watch page request").await
    }

    async fn fetch_continuation_page(&self, token: &str) -> Result<Value, CommentFeedError> {
        let url = self.endpoint("youtubei/v1/next")?;
        log::debug!(
            "Fetching continuation page (token: {}, key: {})",
            mask_secret(token),
            mask_secret(&self.session.api_key)
        );

        let response = self
            .client
            .post(url)
            .query(&[("key", self.session.api_key.as_str())])
            .json(&NextRequest::new(&self.session, token))
            .send()
            .await
            .map_err(map_send_error)?;

        Self::read_json(response, "Continuation request").await
    }
}

impl std::fmt::Debug for InnerTubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InnerTubeClient")
            .field("base_url", &self.base_url.as_str())
            .field("client_name", &self.session.client_name)
            .field("client_version", &self.session.client_version)
            .field("api_key", &mask_secret(&self.session.api_key))
            .finish()
    }
}
