use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use yt_comment_feed::util::video_id_from_input;
use yt_comment_feed::{CommentFetcher, FetchSettings, InnerTubeClient};

/// YouTube動画のコメントスレッドをJSONで出力する
#[derive(Debug, Parser)]
#[command(name = "yt-comment-feed", version)]
struct Cli {
    /// 動画ID、または watch / embed / youtu.be のURL
    video: String,

    /// 取得するページ数・コメント数の上限（0はデフォルトの100）
    #[arg(long, default_value_t = yt_comment_feed::config::DEFAULT_MAX_RESULTS)]
    max_results: usize,

    /// 取得全体の締め切り（秒）。未指定なら待ち続ける
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// 整形して出力
    #[arg(long)]
    pretty: bool,

    /// 終了理由とページ数も出力
    #[arg(long)]
    outcome: bool,

    /// デバッグログを有効化（RUST_LOGが優先）
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // stdoutはJSON出力専用
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let video_id = video_id_from_input(&cli.video)
        .ok_or_else(|| anyhow!("could not find a video id in '{}'", cli.video))?;

    let client = InnerTubeClient::new().context("failed to create InnerTube client")?;
    let fetcher = CommentFetcher::new(client, FetchSettings::new(cli.max_results));

    let fetch = fetcher.fetch_comments_with_outcome(&video_id);
    let outcome = match cli.timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), fetch)
            .await
            .map_err(|_| anyhow!("timed out after {}s fetching comments for {}", secs, video_id))?,
        None => fetch.await,
    }
    .with_context(|| format!("failed to fetch comments for {}", video_id))?;

    let json = match (cli.outcome, cli.pretty) {
        (true, true) => serde_json::to_string_pretty(&outcome)?,
        (true, false) => serde_json::to_string(&outcome)?,
        (false, true) => serde_json::to_string_pretty(&outcome.comments)?,
        (false, false) => serde_json::to_string(&outcome.comments)?,
    };
    println!("{}", json);

    Ok(())
}
