//! InnerTube レスポンスパーサー
//!
//! - 動画ページから最初のcontinuationトークンを探す
//! - continuationレスポンスからページ序数に応じたアイテム配列を取り出す
//! - アイテムを正規化済みコメント・次トークン・無視のいずれかに解決する

use serde_json::Value;

use super::mutations::MutationIndex;
use super::types::{CommentEntityPayload, CommentRenderer, ContinuationItem};
use crate::youtube::types::CommentRecord;

/// コメント欄セクションの識別子
const COMMENT_SECTION_IDENTIFIER: &str = "comment-item-section";

/// 動画ページからコメント欄の最初のcontinuationトークンを取得
///
/// レスポンスは断片の配列の場合がある（`response`を持つ最初の要素を使う）。
/// 経路のどこかが欠けていれば`None`（コメント無効・コメントなしの動画は正常系）。
pub fn locate_comments_token(video_page: &Value) -> Option<String> {
    let response = match video_page {
        Value::Array(fragments) => fragments
            .iter()
            .find_map(|f| f.get("response").filter(|r| !r.is_null()))?,
        other => other.get("response")?,
    };

    let sections = response
        .pointer("/contents/twoColumnWatchNextResults/results/results/contents")?
        .as_array()?;

    let comment_section = sections.iter().find_map(|entry| {
        let section = entry.get("itemSectionRenderer")?;
        let identifier = section.get("sectionIdentifier")?.as_str()?;
        (identifier == COMMENT_SECTION_IDENTIFIER).then_some(section)
    })?;

    comment_section
        .pointer("/contents/0/continuationItemRenderer/continuationEndpoint/continuationCommand/token")?
        .as_str()
        .map(str::to_string)
}

/// ページ序数に応じてアイテム配列を取得
///
/// 序数0（最初のcontinuationレスポンス）は2番目のエンドポイントの
/// `reloadContinuationItemsCommand`、以降は1番目の`appendContinuationItemsAction`。
/// 1番目のエンドポイントは序数0ではコメントと無関係なセクションを持つため、
/// 添字を入れ替えると空または誤ったリストになる。
pub fn extract_page_items(page: &Value, ordinal: usize) -> Option<&Vec<Value>> {
    let pointer = if ordinal == 0 {
        "/onResponseReceivedEndpoints/1/reloadContinuationItemsCommand/continuationItems"
    } else {
        "/onResponseReceivedEndpoints/0/appendContinuationItemsAction/continuationItems"
    };
    page.pointer(pointer)?.as_array()
}

/// 解決済みコメントの出どころ
///
/// 2つのスキーマをここで1回だけ分岐し、`CommentRecord::from`に集約する
#[derive(Debug, Clone, Copy)]
pub enum CommentSource<'a> {
    /// 旧スキーマ: レンダラーにインラインで格納
    Renderer(&'a CommentRenderer),
    /// 新スキーマ: ミューテーションから解決
    Entity(&'a CommentEntityPayload),
}

impl From<CommentSource<'_>> for CommentRecord {
    fn from(source: CommentSource<'_>) -> Self {
        match source {
            CommentSource::Renderer(renderer) => CommentRecord {
                comment_id: renderer.comment_id.clone(),
                author_name: renderer
                    .author_text
                    .as_ref()
                    .and_then(|t| t.simple_text.clone()),
                author_avatar: renderer.author_avatar(),
                text: renderer.plain_text(),
            },
            CommentSource::Entity(entity) => {
                let properties = entity.properties.as_ref();
                let author = entity.author.as_ref();
                CommentRecord {
                    comment_id: properties.and_then(|p| p.comment_id.clone()),
                    author_name: author.and_then(|a| a.display_name.clone()),
                    author_avatar: author.and_then(|a| a.avatar_thumbnail_url.clone()),
                    text: properties
                        .and_then(|p| p.content.as_ref())
                        .and_then(|c| c.content.clone())
                        .unwrap_or_default(),
                }
            }
        }
    }
}

/// アイテムの解決結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedItem {
    /// コメント
    Comment(CommentRecord),
    /// 次ページのトークン（番兵アイテム）
    Continuation(String),
    /// 対象外、またはミューテーション欠落
    Skipped,
}

/// アイテムを1件解決
pub fn reconcile_item(item: &Value, mutations: &MutationIndex) -> ResolvedItem {
    if !item.is_object() {
        return ResolvedItem::Skipped;
    }
    let item: ContinuationItem = match serde_json::from_value(item.clone()) {
        Ok(item) => item,
        Err(e) => {
            log::debug!("Skipping item with unexpected shape: {}", e);
            return ResolvedItem::Skipped;
        }
    };

    if let Some(thread) = &item.comment_thread_renderer {
        if let Some(comment) = &thread.comment {
            // commentRendererが欠けていても、未設定フィールドのまま出力する
            let fallback = CommentRenderer::default();
            let renderer = comment.comment_renderer.as_ref().unwrap_or(&fallback);
            return ResolvedItem::Comment(CommentSource::Renderer(renderer).into());
        }

        if let Some(view_model) = &thread.comment_view_model {
            let entity = view_model
                .comment_key()
                .and_then(|key| mutations.comment_entity(key));
            return match entity {
                Some(entity) => ResolvedItem::Comment(CommentSource::Entity(entity).into()),
                None => {
                    log::debug!("No mutation for comment key {:?}", view_model.comment_key());
                    ResolvedItem::Skipped
                }
            };
        }

        return ResolvedItem::Skipped;
    }

    if let Some(token) = item
        .continuation_item_renderer
        .as_ref()
        .and_then(|r| r.token())
    {
        return ResolvedItem::Continuation(token.to_string());
    }

    ResolvedItem::Skipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn watch_page(sections: Value) -> Value {
        json!({
            "response": {
                "contents": {
                    "twoColumnWatchNextResults": {
                        "results": {"results": {"contents": sections}}
                    }
                }
            }
        })
    }

    fn comment_section(token: &str) -> Value {
        json!({
            "itemSectionRenderer": {
                "sectionIdentifier": "comment-item-section",
                "contents": [{
                    "continuationItemRenderer": {
                        "continuationEndpoint": {"continuationCommand": {"token": token}}
                    }
                }]
            }
        })
    }

    #[test]
    fn test_locate_token_object_response() {
        let page = watch_page(json!([
            {"videoPrimaryInfoRenderer": {}},
            {"itemSectionRenderer": {"sectionIdentifier": "other", "contents": []}},
            comment_section("T1")
        ]));
        assert_eq!(locate_comments_token(&page), Some("T1".to_string()));
    }

    #[test]
    fn test_locate_token_fragment_array() {
        let page = json!([
            {"page": "watch"},
            watch_page(json!([comment_section("T-array")])),
        ]);
        assert_eq!(locate_comments_token(&page), Some("T-array".to_string()));
    }

    #[test]
    fn test_locate_token_no_comment_section() {
        let page = watch_page(json!([
            {"itemSectionRenderer": {"sectionIdentifier": "other", "contents": []}}
        ]));
        assert_eq!(locate_comments_token(&page), None);
    }

    #[test]
    fn test_locate_token_comments_disabled() {
        // コメント無効時はcontinuationItemRendererの代わりにメッセージが入る
        let page = watch_page(json!([{
            "itemSectionRenderer": {
                "sectionIdentifier": "comment-item-section",
                "contents": [{"messageRenderer": {"text": {"runs": [{"text": "Comments are turned off."}]}}}]
            }
        }]));
        assert_eq!(locate_comments_token(&page), None);
    }

    #[test]
    fn test_locate_token_missing_response() {
        assert_eq!(locate_comments_token(&json!({})), None);
        assert_eq!(locate_comments_token(&json!([{"page": "watch"}])), None);
        assert_eq!(locate_comments_token(&json!("not a page")), None);
    }

    #[test]
    fn test_extract_items_first_page_uses_reload_command() {
        let page = json!({
            "onResponseReceivedEndpoints": [
                {"reloadContinuationItemsCommand": {"continuationItems": [{"header": 1}]}},
                {"reloadContinuationItemsCommand": {"continuationItems": [{"a": 1}, {"b": 2}]}}
            ]
        });
        let items = extract_page_items(&page, 0).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], json!({"a": 1}));
    }

    #[test]
    fn test_extract_items_later_page_uses_append_action() {
        let page = json!({
            "onResponseReceivedEndpoints": [
                {"appendContinuationItemsAction": {"continuationItems": [{"c": 3}]}}
            ]
        });
        assert_eq!(extract_page_items(&page, 1).unwrap().len(), 1);
        assert_eq!(extract_page_items(&page, 5).unwrap().len(), 1);
        // 序数0では2番目のエンドポイントを見るため見つからない
        assert!(extract_page_items(&page, 0).is_none());
    }

    #[test]
    fn test_extract_items_absent() {
        assert!(extract_page_items(&json!({}), 0).is_none());
        assert!(extract_page_items(&json!({"onResponseReceivedEndpoints": []}), 1).is_none());
    }

    #[test]
    fn test_reconcile_legacy_renderer() {
        let item = json!({
            "commentThreadRenderer": {
                "comment": {
                    "commentRenderer": {
                        "commentId": "c1",
                        "authorText": {"simpleText": "A"},
                        "authorThumbnail": {"thumbnails": [
                            {"url": "https://yt3.example/a-small.jpg"},
                            {"url": "https://yt3.example/a-large.jpg"}
                        ]},
                        "contentText": {"runs": [{"text": "abc"}, {"text": " def"}]}
                    }
                }
            }
        });
        let resolved = reconcile_item(&item, &MutationIndex::default());
        assert_eq!(
            resolved,
            ResolvedItem::Comment(CommentRecord {
                comment_id: Some("c1".to_string()),
                author_name: Some("A".to_string()),
                author_avatar: Some("https://yt3.example/a-small.jpg".to_string()),
                text: "abc def".to_string(),
            })
        );
    }

    #[test]
    fn test_reconcile_legacy_with_missing_fields() {
        let item = json!({"commentThreadRenderer": {"comment": {"commentRenderer": {"commentId": "c9"}}}});
        let resolved = reconcile_item(&item, &MutationIndex::default());
        assert_eq!(
            resolved,
            ResolvedItem::Comment(CommentRecord {
                comment_id: Some("c9".to_string()),
                author_name: None,
                author_avatar: None,
                text: String::new(),
            })
        );
    }

    #[test]
    fn test_reconcile_legacy_with_wrong_typed_field() {
        // authorTextが文字列でも、コメント自体は出力する
        let item = json!({
            "commentThreadRenderer": {"comment": {"commentRenderer": {
                "commentId": "c1",
                "authorText": "A",
                "contentText": {"runs": [{"text": "hi"}]}
            }}}
        });
        assert_eq!(
            reconcile_item(&item, &MutationIndex::default()),
            ResolvedItem::Comment(CommentRecord {
                comment_id: Some("c1".to_string()),
                author_name: None,
                author_avatar: None,
                text: "hi".to_string(),
            })
        );
    }

    #[test]
    fn test_reconcile_mutation_with_wrong_typed_field() {
        let page = json!({
            "frameworkUpdates": {"entityBatchUpdate": {"mutations": [{
                "entityKey": "key-2",
                "payload": {"commentEntityPayload": {
                    "properties": {"commentId": "c2", "content": {"content": "there"}},
                    "author": {"displayName": "B", "avatarThumbnailUrl": {"url": "x"}}
                }}
            }]}}
        });
        let index = MutationIndex::from_page(&page);
        let item = json!({"commentThreadRenderer": {"commentViewModel": {"commentKey": "key-2"}}});
        assert_eq!(
            reconcile_item(&item, &index),
            ResolvedItem::Comment(CommentRecord {
                comment_id: Some("c2".to_string()),
                author_name: Some("B".to_string()),
                author_avatar: None,
                text: "there".to_string(),
            })
        );
    }

    #[test]
    fn test_reconcile_view_model_hit() {
        let page = json!({
            "frameworkUpdates": {"entityBatchUpdate": {"mutations": [{
                "entityKey": "key-2",
                "payload": {"commentEntityPayload": {
                    "properties": {"commentId": "c2", "content": {"content": "there"}},
                    "author": {"displayName": "B", "avatarThumbnailUrl": "https://yt3.example/b.jpg"}
                }}
            }]}}
        });
        let index = MutationIndex::from_page(&page);
        let item = json!({
            "commentThreadRenderer": {"commentViewModel": {"commentViewModel": {"commentKey": "key-2"}}}
        });
        assert_eq!(
            reconcile_item(&item, &index),
            ResolvedItem::Comment(CommentRecord {
                comment_id: Some("c2".to_string()),
                author_name: Some("B".to_string()),
                author_avatar: Some("https://yt3.example/b.jpg".to_string()),
                text: "there".to_string(),
            })
        );
    }

    #[test]
    fn test_reconcile_view_model_miss_is_skipped() {
        let item = json!({"commentThreadRenderer": {"commentViewModel": {"commentKey": "nowhere"}}});
        assert_eq!(
            reconcile_item(&item, &MutationIndex::default()),
            ResolvedItem::Skipped
        );
    }

    #[test]
    fn test_reconcile_mutation_without_comment_entity_is_skipped() {
        let page = json!({
            "frameworkUpdates": {"entityBatchUpdate": {"mutations": [
                {"entityKey": "k", "payload": {}}
            ]}}
        });
        let index = MutationIndex::from_page(&page);
        let item = json!({"commentThreadRenderer": {"commentViewModel": {"commentKey": "k"}}});
        assert_eq!(reconcile_item(&item, &index), ResolvedItem::Skipped);
    }

    #[test]
    fn test_reconcile_continuation_sentinel() {
        let item = json!({
            "continuationItemRenderer": {
                "continuationEndpoint": {"continuationCommand": {"token": "T2"}}
            }
        });
        assert_eq!(
            reconcile_item(&item, &MutationIndex::default()),
            ResolvedItem::Continuation("T2".to_string())
        );
    }

    #[test]
    fn test_reconcile_unknown_items_are_skipped() {
        let index = MutationIndex::default();
        assert_eq!(reconcile_item(&json!({"adSlotRenderer": {}}), &index), ResolvedItem::Skipped);
        assert_eq!(reconcile_item(&json!(null), &index), ResolvedItem::Skipped);
        assert_eq!(
            reconcile_item(&json!({"continuationItemRenderer": {"trigger": "CONTINUATION_TRIGGER_ON_ITEM_SHOWN"}}), &index),
            ResolvedItem::Skipped
        );
    }
}
