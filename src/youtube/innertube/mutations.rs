//! ミューテーションインデックス
//!
//! 新スキーマではコメントスレッドは`commentKey`だけを持ち、
//! 投稿者・本文は`frameworkUpdates.entityBatchUpdate.mutations`側にある。
//! インデックスは1ページ分のみ有効で、ページ処理後に破棄する。

use serde_json::Value;
use std::collections::HashMap;

use super::types::{CommentEntityPayload, Mutation};

/// entityKey → ミューテーションのルックアップ
#[derive(Debug, Default)]
pub struct MutationIndex {
    entries: HashMap<String, Mutation>,
}

impl MutationIndex {
    /// ページレスポンスからインデックスを構築
    ///
    /// バッチ更新ブロックがなければ空（旧スキーマでは通常）。
    /// 同じキーが複数回現れた場合は後勝ち。
    pub fn from_page(page: &Value) -> Self {
        let Some(mutations) = page
            .pointer("/frameworkUpdates/entityBatchUpdate/mutations")
            .and_then(Value::as_array)
        else {
            return Self::default();
        };

        let mut entries = HashMap::with_capacity(mutations.len());
        for raw in mutations {
            let mutation = match Mutation::deserialize_lenient(raw) {
                Some(m) => m,
                None => continue,
            };
            if let Some(key) = mutation.entity_key.clone() {
                entries.insert(key, mutation);
            }
        }

        log::debug!("Built mutation index with {} entries", entries.len());
        Self { entries }
    }

    /// キーに対応するコメント本体を取得
    pub fn comment_entity(&self, key: &str) -> Option<&CommentEntityPayload> {
        self.entries
            .get(key)?
            .payload
            .as_ref()?
            .comment_entity_payload
            .as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Mutation {
    /// 型が合わない要素（nullなど）は読み飛ばす
    fn deserialize_lenient(raw: &Value) -> Option<Self> {
        if !raw.is_object() {
            return None;
        }
        serde_json::from_value(raw.clone())
            .map_err(|e| log::debug!("Skipping malformed mutation: {}", e))
            .ok()
    }
}
