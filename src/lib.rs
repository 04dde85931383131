pub mod config;
pub mod util; // doctestのためpubにする
pub mod youtube;

pub use config::FetchSettings;
pub use youtube::{
    CommentFeedError, CommentFetcher, CommentRecord, FetchOutcome, Termination,
};
pub use youtube::innertube::{CommentTransport, InnerTubeClient, SessionContext};

/// 動画IDを指定してコメントを取得
///
/// YouTube本番のInnerTubeに接続する。接続先やHTTPクライアントを差し替える場合は
/// `CommentFetcher`と`InnerTubeClient`を直接組み立てること。
///
/// # Errors
/// 通信・HTTP・JSONパースに失敗した場合のみエラーを返す。
/// コメント欄のない動画は空のリストになる。
pub async fn fetch_comments(
    video_id: &str,
    settings: FetchSettings,
) -> Result<Vec<CommentRecord>, CommentFeedError> {
    let client = InnerTubeClient::new()?;
    CommentFetcher::new(client, settings)
        .fetch_comments(video_id)
        .await
}
