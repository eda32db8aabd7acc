//! Integration tests for cached row access through the list feed.

use sheetfeed_core::memory::FeedCall;
use sheetfeed_core::{Error, FeedClient, ID_FIELD, Row, RowQuery};

use crate::common::{BOOK, SHEET, TestHarness};

#[tokio::test]
async fn test_get_rows_projects_entries() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;

    let rows = ws.get_rows(&RowQuery::all()).await.unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get("name"), Some("Ada"));
    assert_eq!(rows[0].get("email"), Some("ada@example.com"));
    assert!(rows.iter().all(|r| r.id().is_some()));
    assert!(rows.iter().all(|r| r.get(ID_FIELD).is_some()));
}

#[tokio::test]
async fn test_get_rows_filtered_applies_predicate_locally() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;

    let rows = ws
        .get_rows_filtered(&RowQuery::all(), |r| {
            r.get("age")
                .and_then(|a| a.parse::<u32>().ok())
                .is_some_and(|age| age > 40)
        })
        .await
        .unwrap();

    let names: Vec<_> = rows.iter().filter_map(|r| r.get("name")).collect();
    assert_eq!(names, vec!["Grace", "Alan"]);
    assert_eq!(harness.memory.calls(), vec![FeedCall::List(None)]);
}

#[tokio::test]
async fn test_get_rows_ordered_and_reversed_by_service() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;

    let rows = ws
        .get_rows(&RowQuery::all().with_order_by("column:name").reversed())
        .await
        .unwrap();

    let names: Vec<_> = rows.iter().filter_map(|r| r.get("name")).collect();
    assert_eq!(names, vec!["Grace", "Alan", "Ada"]);
}

#[tokio::test]
async fn test_row_cache_is_reused_until_flushed() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;

    ws.get_rows(&RowQuery::all()).await.unwrap();
    ws.get_rows(&RowQuery::all()).await.unwrap();
    assert_eq!(harness.list_fetches(), 1);

    ws.flush_cache();
    ws.get_rows(&RowQuery::all()).await.unwrap();
    assert_eq!(harness.list_fetches(), 2);
}

#[tokio::test]
async fn test_switching_from_unfiltered_to_filtered_query_refetches() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;

    ws.get_rows(&RowQuery::all()).await.unwrap();
    let rows = ws
        .get_rows(&RowQuery::all().with_query("name = Grace"))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some("Grace"));
    assert_eq!(harness.list_fetches(), 2);
}

#[tokio::test]
async fn test_empty_cache_counts_as_miss() {
    let harness = TestHarness::with_rows(&[&["Name"]]);
    let mut ws = harness.worksheet().await;

    assert!(ws.get_rows(&RowQuery::all()).await.unwrap().is_empty());
    assert!(ws.get_rows(&RowQuery::all()).await.unwrap().is_empty());
    assert_eq!(harness.list_fetches(), 2);
}

#[tokio::test]
async fn test_update_row_merges_supplied_fields() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;
    let rows = ws.get_rows(&RowQuery::all()).await.unwrap();

    let mut change = Row::new().with("age", "86");
    change.insert(ID_FIELD, rows[1].id().unwrap());
    let updated = ws.update_row(&change).await.unwrap();

    assert_eq!(updated.get("age"), Some("86"));
    assert_eq!(updated.get("name"), Some("Grace"));
    assert_eq!(updated.id(), rows[1].id());
    assert_eq!(harness.cell(3, 3).as_deref(), Some("86"));
    assert_eq!(harness.cell(3, 1).as_deref(), Some("Grace"));

    // Cached entry was replaced in place; no refetch needed.
    let cached = ws.get_rows(&RowQuery::all()).await.unwrap();
    assert_eq!(cached[1].get("age"), Some("86"));
    assert_eq!(harness.list_fetches(), 1);
}

#[tokio::test]
async fn test_update_row_outside_cached_results_fetches_by_id() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;
    let all = ws.get_rows(&RowQuery::all()).await.unwrap();
    let alan_id = all[2].id().unwrap().to_string();

    ws.get_rows(&RowQuery::all().with_query("name = Ada"))
        .await
        .unwrap();
    let change = Row::new().with(ID_FIELD, alan_id.as_str()).with("age", "42");
    let updated = ws.update_row(&change).await.unwrap();

    assert_eq!(updated.get("name"), Some("Alan"));
    assert_eq!(harness.cell(4, 3).as_deref(), Some("42"));
    assert!(harness.memory.calls().contains(&FeedCall::ListEntry(alan_id)));
}

#[tokio::test]
async fn test_update_row_unknown_id_fails() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;

    let err = ws
        .update_row(&Row::new().with(ID_FIELD, "nope"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RowNotFound { ref id } if id == "nope"));
}

#[tokio::test]
async fn test_update_row_by_index_is_relative_to_result_set() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;
    ws.get_rows(&RowQuery::all().with_order_by("column:name").reversed())
        .await
        .unwrap();

    // Index 0 of the reversed result set is Grace, sheet row 3.
    let updated = ws
        .update_row_by_index(0, &Row::new().with("email", "hopper@example.com"))
        .await
        .unwrap();

    assert_eq!(updated.get("name"), Some("Grace"));
    assert_eq!(harness.cell(3, 2).as_deref(), Some("hopper@example.com"));
}

#[tokio::test]
async fn test_update_row_by_index_out_of_range() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;
    ws.get_rows(&RowQuery::all()).await.unwrap();

    let err = ws
        .update_row_by_index(10, &Row::new().with("age", "1"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::IndexOutOfRange { index: 10, len: 3 }));
    assert_eq!(
        harness
            .memory
            .count_calls(|c| matches!(c, FeedCall::UpdateRow(_))),
        0
    );
}

#[tokio::test]
async fn test_insert_row_appends_to_warm_cache() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;
    ws.get_rows(&RowQuery::all()).await.unwrap();

    let inserted = ws
        .insert_row(&Row::new().with("name", "Barbara").with("age", "57"))
        .await
        .unwrap();

    assert!(inserted.id().is_some());
    assert_eq!(harness.cell(5, 1).as_deref(), Some("Barbara"));
    assert_eq!(harness.cell(5, 2), None);

    let rows = ws.get_rows(&RowQuery::all()).await.unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[3].get("name"), Some("Barbara"));
    assert_eq!(harness.list_fetches(), 1);
}

#[tokio::test]
async fn test_insert_row_with_cold_cache_leaves_it_cold() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;

    ws.insert_row(&Row::new().with("name", "Barbara"))
        .await
        .unwrap();
    assert_eq!(harness.list_fetches(), 0);

    let rows = ws.get_rows(&RowQuery::all()).await.unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(harness.list_fetches(), 1);
}

#[tokio::test]
async fn test_delete_row_by_id_updates_cache() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;
    let rows = ws.get_rows(&RowQuery::all()).await.unwrap();

    ws.delete_row(&rows[0]).await.unwrap();

    assert_eq!(harness.cell(2, 1).as_deref(), Some("Grace"));
    let cached = ws.get_rows(&RowQuery::all()).await.unwrap();
    assert_eq!(cached.len(), 2);
    assert_eq!(cached[0].id(), rows[1].id());
    assert_eq!(harness.list_fetches(), 1);
}

#[tokio::test]
async fn test_delete_row_by_index() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;

    ws.delete_row_by_index(1).await.unwrap();

    assert_eq!(harness.cell(2, 1).as_deref(), Some("Ada"));
    assert_eq!(harness.cell(3, 1).as_deref(), Some("Alan"));
    assert_eq!(harness.cell(4, 1), None);
}

#[tokio::test]
async fn test_delete_all_rows() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;

    let deleted = ws.delete_all_rows(0).await.unwrap();

    assert_eq!(deleted, 3);
    assert_eq!(harness.cell(1, 1).as_deref(), Some("Name"));
    assert_eq!(harness.cell(2, 1), None);
    assert!(ws.get_rows(&RowQuery::all()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_all_rows_keeps_leading_rows() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;

    let deleted = ws.delete_all_rows(1).await.unwrap();

    assert_eq!(deleted, 2);
    assert_eq!(harness.cell(2, 1).as_deref(), Some("Ada"));
    assert_eq!(harness.cell(3, 1), None);

    // The cache was flushed, so the next read goes to the service.
    let before = harness.list_fetches();
    let rows = ws.get_rows(&RowQuery::all()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(harness.list_fetches(), before + 1);
}

#[tokio::test]
async fn test_delete_all_rows_with_more_leading_rows_than_rows() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;

    let deleted = ws.delete_all_rows(5).await.unwrap();

    assert_eq!(deleted, 0);
    assert_eq!(
        harness
            .memory
            .count_calls(|c| matches!(c, FeedCall::DeleteRow(_))),
        0
    );
    assert_eq!(harness.cell(4, 1).as_deref(), Some("Alan"));

    let before = harness.list_fetches();
    assert_eq!(ws.get_rows(&RowQuery::all()).await.unwrap().len(), 3);
    assert_eq!(harness.list_fetches(), before + 1);
}

#[tokio::test]
async fn test_delete_all_rows_failure_flushes_cache() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;
    ws.get_rows(&RowQuery::all()).await.unwrap();

    // Grace disappears behind the worksheet's back, so her deletion fails.
    let entries = harness.memory.list_feed(BOOK, SHEET, None).await.unwrap();
    harness.memory.delete_row(&entries[1]).await.unwrap();

    let err = ws.delete_all_rows(0).await.unwrap_err();
    assert!(matches!(err, Error::Service { status: 404, .. }));

    // Ada was deleted before the failure; the next read sees only Alan.
    let before = harness.list_fetches();
    let rows = ws.get_rows(&RowQuery::all()).await.unwrap();
    assert_eq!(harness.list_fetches(), before + 1);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some("Alan"));
}
