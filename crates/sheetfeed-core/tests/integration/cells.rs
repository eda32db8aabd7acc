//! Integration tests for cell lookup and batched cell writes.

use sheetfeed_core::memory::FeedCall;
use sheetfeed_core::{Error, FeedClient, RowQuery};

use crate::common::{BOOK, SHEET, TestHarness, grid};

#[tokio::test]
async fn test_batch_writes_block_and_blanks_uncovered_cells() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;

    let data = grid(&[&["Ada L", "ada@lovelace.org"], &["Grace H"]]);
    let outcome = ws.batch((2, 1), (3, 2), &data).await.unwrap();

    assert_eq!(outcome.succeeded(), 4);
    assert_eq!(harness.memory.calls(), vec![FeedCall::Batch(4)]);
    assert_eq!(harness.cell(2, 1).as_deref(), Some("Ada L"));
    assert_eq!(harness.cell(2, 2).as_deref(), Some("ada@lovelace.org"));
    assert_eq!(harness.cell(3, 1).as_deref(), Some("Grace H"));
    assert_eq!(harness.cell(3, 2), None);
    // Outside the rectangle nothing changes.
    assert_eq!(harness.cell(3, 3).as_deref(), Some("85"));
}

#[tokio::test]
async fn test_batch_writes_missing_cells_directly() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;

    let data = grid(&[&["x", "y"]]);
    let outcome = ws.batch((6, 1), (6, 2), &data).await.unwrap();

    assert!(outcome.statuses.is_empty());
    assert_eq!(
        harness.memory.calls(),
        vec![FeedCall::UpdateCell(6, 1), FeedCall::UpdateCell(6, 2)]
    );
    assert_eq!(harness.cell(6, 2).as_deref(), Some("y"));
    assert_eq!(ws.find_cell(6, 1).map(|c| c.content.as_str()), Some("x"));
}

#[tokio::test]
async fn test_batch_ignores_data_outside_range() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;

    let data = grid(&[&["a", "b"], &["c", "d"]]);
    ws.batch((2, 1), (2, 1), &data).await.unwrap();

    assert_eq!(harness.cell(2, 1).as_deref(), Some("a"));
    assert_eq!(harness.cell(2, 2).as_deref(), Some("ada@example.com"));
    assert_eq!(harness.cell(3, 1).as_deref(), Some("Grace"));
}

#[tokio::test]
async fn test_batch_is_best_effort() {
    let harness = TestHarness::people();
    harness.memory.reject_batch_updates_at(BOOK, SHEET, 2, 2);
    let mut ws = harness.worksheet().await;

    let outcome = ws
        .batch((2, 1), (2, 2), &grid(&[&["A", "B"]]))
        .await
        .unwrap();

    assert_eq!(outcome.succeeded(), 1);
    let failures: Vec<_> = outcome.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].code, 403);
    assert_eq!(harness.cell(2, 1).as_deref(), Some("A"));
    assert_eq!(harness.cell(2, 2).as_deref(), Some("ada@example.com"));
}

#[tokio::test]
async fn test_batch_failing_direct_write_discards_queued_updates() {
    let harness = TestHarness::people();
    harness.memory.fail_writes_at(BOOK, SHEET, 5, 1);
    let mut ws = harness.worksheet().await;

    // (4, 1) exists and is queued; (5, 1) is new and written directly.
    let err = ws
        .batch((4, 1), (5, 1), &grid(&[&["Alan T"], &["Barbara"]]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Service { status: 503, .. }));
    assert!(ws.pending_batch().is_empty());
    assert_eq!(ws.find_cell(4, 1).map(|c| c.content.as_str()), Some("Alan"));
    assert_eq!(harness.memory.calls(), vec![FeedCall::UpdateCell(5, 1)]);

    harness.memory.clear_calls();
    ws.batch((1, 1), (1, 1), &grid(&[&["Name"]])).await.unwrap();
    assert_eq!(harness.memory.calls(), vec![FeedCall::Batch(1)]);
    assert_eq!(harness.cell(4, 1).as_deref(), Some("Alan"));
}

#[tokio::test]
async fn test_batch_request_failure_restores_cached_cells() {
    let harness = TestHarness::people();
    harness.memory.fail_writes_at(BOOK, SHEET, 2, 2);
    let mut ws = harness.worksheet().await;

    let err = ws
        .batch((2, 1), (2, 2), &grid(&[&["A", "B"]]))
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    assert!(ws.pending_batch().is_empty());
    assert_eq!(ws.find_cell(2, 1).map(|c| c.content.as_str()), Some("Ada"));
    assert_eq!(
        ws.find_cell(2, 2).map(|c| c.input_value.as_str()),
        Some("ada@example.com")
    );
    assert_eq!(harness.cell(2, 1).as_deref(), Some("Ada"));
}

#[tokio::test]
async fn test_batch_verify_key_content_updates_and_appends() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;

    let data = grid(&[
        &["Grace", "grace@navy.mil", "86"],
        &["Barbara", "barbara@example.com", "57"],
    ]);
    let outcome = ws.batch_verify_key_content(&data).await.unwrap();

    assert_eq!(outcome.succeeded(), 3);
    assert_eq!(harness.cell(3, 2).as_deref(), Some("grace@navy.mil"));
    assert_eq!(harness.cell(3, 3).as_deref(), Some("86"));
    assert_eq!(harness.cell(5, 1).as_deref(), Some("Barbara"));
    assert_eq!(harness.cell(5, 3).as_deref(), Some("57"));
    assert_eq!(
        harness.memory.calls(),
        vec![FeedCall::InsertRow, FeedCall::Batch(3)]
    );
}

#[tokio::test]
async fn test_batch_verify_key_content_requires_key_in_first_column() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;

    // "36" only appears in the Age column, so the row is appended.
    let data = grid(&[&["36", "someone@example.com", "20"]]);
    ws.batch_verify_key_content(&data).await.unwrap();

    assert_eq!(harness.cell(2, 3).as_deref(), Some("36"));
    assert_eq!(harness.cell(5, 1).as_deref(), Some("36"));
    assert_eq!(harness.cell(5, 2).as_deref(), Some("someone@example.com"));
}

#[tokio::test]
async fn test_batch_verify_key_content_stops_at_empty_cell() {
    let harness = TestHarness::with_rows(&[&["Name", "Email", "Age"], &["Ada", "", "36"]]);
    let mut ws = harness.worksheet().await;

    let data = grid(&[&["Ada", "ada@example.com", "37"]]);
    ws.batch_verify_key_content(&data).await.unwrap();

    assert_eq!(harness.memory.calls(), vec![FeedCall::Batch(1)]);
    assert_eq!(harness.cell(2, 2), None);
    assert_eq!(harness.cell(2, 3).as_deref(), Some("36"));
}

#[tokio::test]
async fn test_batch_verify_key_content_failure_sends_nothing() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;

    // The second row is too short to append, after the first was queued.
    let data = grid(&[&["Grace", "grace@navy.mil", "99"], &["Short"]]);
    let err = ws.batch_verify_key_content(&data).await.unwrap_err();

    assert!(matches!(err, Error::Validation { .. }));
    assert!(ws.pending_batch().is_empty());
    assert_eq!(ws.find_cell(3, 3).map(|c| c.content.as_str()), Some("85"));
    assert_eq!(ws.find_cell_by_contents("grace@example.com").map(|c| c.row), Some(3));
    assert!(harness.memory.calls().is_empty());

    // A later unrelated batch sends only its own update.
    ws.batch((1, 1), (1, 1), &grid(&[&["Name"]])).await.unwrap();
    assert_eq!(harness.memory.calls(), vec![FeedCall::Batch(1)]);
    assert_eq!(harness.cell(3, 2).as_deref(), Some("grace@example.com"));
    assert_eq!(harness.cell(3, 3).as_deref(), Some("85"));
}

#[tokio::test]
async fn test_insert_as_last_maps_header_to_columns() {
    let harness = TestHarness::with_rows(&[&["First Name", "E-mail"]]);
    let mut ws = harness.worksheet().await;

    let row = ws
        .insert_as_last(&["Ada".to_string(), "ada@example.com".to_string()])
        .await
        .unwrap();

    assert_eq!(row.get("firstname"), Some("Ada"));
    assert_eq!(row.get("email"), Some("ada@example.com"));
    assert_eq!(harness.cell(2, 2).as_deref(), Some("ada@example.com"));

    let rows = ws.get_rows(&RowQuery::all()).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_insert_as_last_short_row_is_rejected() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;

    let err = ws.insert_as_last(&["Ada".to_string()]).await.unwrap_err();

    assert!(matches!(err, Error::Validation { .. }));
    assert!(harness.memory.calls().is_empty());
}

#[tokio::test]
async fn test_refresh_cells_picks_up_remote_changes() {
    let harness = TestHarness::people();
    let mut ws = harness.worksheet().await;
    harness
        .api
        .client()
        .update_cell(BOOK, SHEET, 1, 4, "Phone")
        .await
        .unwrap();
    assert_eq!(ws.header_row().len(), 3);

    ws.refresh_cells().await.unwrap();
    assert_eq!(ws.header_row().len(), 4);
    assert_eq!(ws.header_row()[3], "Phone");
}
