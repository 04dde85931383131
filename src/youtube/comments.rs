//! コメント取得ループ
//!
//! 動画ページ → 最初のトークン → continuation取得を繰り返し、
//! 正規化済みコメントを蓄積する。状態はすべて呼び出しごとに閉じており、
//! 別の動画IDに対する同時呼び出しは互いに独立している。

use serde::Serialize;

use super::errors::CommentFeedError;
use super::innertube::client::CommentTransport;
use super::innertube::mutations::MutationIndex;
use super::innertube::parser::{extract_page_items, locate_comments_token, reconcile_item, ResolvedItem};
use super::types::CommentRecord;
use crate::config::FetchSettings;
use crate::util::mask_secret;

/// ループの終了理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Termination {
    /// 動画ページにコメント欄のトークンがない（continuation取得なし）
    NoCommentSection,
    /// ページにアイテム配列がない
    EndOfItems,
    /// サーバーが同じトークンを返した（最終ページ）
    RepeatedToken,
    /// ページ数が上限に達した
    PageBudgetReached,
    /// コメント数が上限に達した
    RecordBudgetReached,
}

/// 取得結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOutcome {
    pub comments: Vec<CommentRecord>,
    pub pages_fetched: usize,
    pub termination: Termination,
}

/// 1回の取得中だけ生きるページネーション状態
struct Pagination {
    token: String,
    previous_token: Option<String>,
    page_count: usize,
    comments: Vec<CommentRecord>,
    budget: usize,
}

impl Pagination {
    fn new(token: String, budget: usize) -> Self {
        Self {
            token,
            previous_token: None,
            page_count: 0,
            comments: Vec::new(),
            budget,
        }
    }

    /// 続行条件を満たさなければ終了理由を返す
    ///
    /// 上限値はページ数とコメント数の両方に同じ値を使う
    fn stop_reason(&self) -> Option<Termination> {
        if self.previous_token.as_deref() == Some(self.token.as_str()) {
            Some(Termination::RepeatedToken)
        } else if self.page_count >= self.budget {
            Some(Termination::PageBudgetReached)
        } else if self.comments.len() >= self.budget {
            Some(Termination::RecordBudgetReached)
        } else {
            None
        }
    }

    /// 1ページ分のアイテムを解決して蓄積する
    ///
    /// 番兵アイテムがなければトークンは据え置き（次の判定で重複として止まる）
    fn absorb(&mut self, items: &[serde_json::Value], mutations: &MutationIndex) {
        for item in items {
            match reconcile_item(item, mutations) {
                ResolvedItem::Comment(record) => self.comments.push(record),
                ResolvedItem::Continuation(next) => self.token = next,
                ResolvedItem::Skipped => {}
            }
        }
    }

    fn finish(mut self, termination: Termination) -> FetchOutcome {
        if self.comments.len() > self.budget {
            log::debug!(
                "Truncating {} comments to budget {}",
                self.comments.len(),
                self.budget
            );
            self.comments.truncate(self.budget);
        }
        FetchOutcome {
            comments: self.comments,
            pages_fetched: self.page_count,
            termination,
        }
    }
}

/// コメント取得エンジン
#[derive(Debug, Clone)]
pub struct CommentFetcher<T> {
    transport: T,
    settings: FetchSettings,
}

impl<T: CommentTransport> CommentFetcher<T> {
    pub fn new(transport: T, settings: FetchSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// 動画のコメントを取得
    ///
    /// # Errors
    /// 通信・HTTP・JSONパースの失敗時のみエラー。途中までの結果は返さない。
    pub async fn fetch_comments(&self, video_id: &str) -> Result<Vec<CommentRecord>, CommentFeedError> {
        Ok(self.fetch_comments_with_outcome(video_id).await?.comments)
    }

    /// 終了理由とページ数を含めてコメントを取得
    pub async fn fetch_comments_with_outcome(
        &self,
        video_id: &str,
    ) -> Result<FetchOutcome, CommentFeedError> {
        let video_page = self.transport.fetch_initial_page(video_id).await?;

        let Some(token) = locate_comments_token(&video_page) else {
            log::info!("No comment section found for video: {}", video_id);
            return Ok(FetchOutcome {
                comments: Vec::new(),
                pages_fetched: 0,
                termination: Termination::NoCommentSection,
            });
        };

        let budget = self.settings.max_results;
        let mut state = Pagination::new(token, budget);

        let termination = loop {
            if let Some(reason) = state.stop_reason() {
                break reason;
            }

            let page = self.transport.fetch_continuation_page(&state.token).await?;
            state.previous_token = Some(state.token.clone());

            let mutations = MutationIndex::from_page(&page);
            let Some(items) = extract_page_items(&page, state.page_count) else {
                log::debug!("Page {} has no item list, stopping", state.page_count);
                state.page_count += 1;
                break Termination::EndOfItems;
            };

            let before = state.comments.len();
            state.absorb(items, &mutations);
            log::debug!(
                "Page {}: {} items, {} comments added, next token {}",
                state.page_count,
                items.len(),
                state.comments.len() - before,
                mask_secret(&state.token)
            );

            state.page_count += 1;
        };

        let outcome = state.finish(termination);
        log::info!(
            "Fetched {} comments for video {} across {} pages ({:?})",
            outcome.comments.len(),
            video_id,
            outcome.pages_fetched,
            outcome.termination
        );
        Ok(outcome)
    }
}
