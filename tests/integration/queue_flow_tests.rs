//! Build queue behavior across the review surface.

use buildboard::models::ticket::TicketStatus;
use buildboard::review::verb::ReviewVerb;

use super::test_helpers::{Harness, REVIEWER};

#[tokio::test]
async fn queue_snapshot_reflects_current_and_waiting_builds() {
    let harness = Harness::new().await;
    harness
        .submit("<#app-42> login crashes on submit", "src-1")
        .await;
    harness
        .submit("please add a dark mode to <#app-7> settings", "src-2")
        .await;

    harness
        .review
        .apply("msg-1", ReviewVerb::SendToBuild, REVIEWER)
        .await
        .expect("first");
    harness
        .review
        .apply("msg-2", ReviewVerb::SendToBuild, REVIEWER)
        .await
        .expect("second");

    let snapshot = harness.queue.status().await;
    assert!(snapshot.busy);
    assert_eq!(snapshot.queue_length, 1);
    assert_eq!(
        snapshot.current_title.as_deref(),
        Some("<#app-42> login crashes on submit")
    );
    assert!(snapshot.last_error.is_none());
}

#[tokio::test]
async fn waiting_builds_keep_submission_order() {
    let harness = Harness::new().await;
    for (text, src) in [
        ("<#app-42> login crashes on submit", "src-1"),
        ("please add a dark mode to <#app-7> settings", "src-2"),
        ("<#app-42> export fails for large files", "src-3"),
    ] {
        harness.submit(text, src).await;
    }

    for handle in ["msg-1", "msg-2", "msg-3"] {
        harness
            .review
            .apply(handle, ReviewVerb::SendToBuild, REVIEWER)
            .await
            .expect("send to build");
    }

    assert_eq!(
        harness.queue.current_handle().await.as_deref(),
        Some("msg-1")
    );

    // Drain the queue the way the worker integration does.
    harness.queue.complete().await;
    let next = harness.queue.dispatch().await.expect("next");
    assert_eq!(next.handle, "msg-2");

    harness.queue.complete().await;
    let next = harness.queue.dispatch().await.expect("next");
    assert_eq!(next.handle, "msg-3");
}

#[tokio::test]
async fn ticket_statuses_track_their_queue_position() {
    let harness = Harness::new().await;
    harness
        .submit("<#app-42> login crashes on submit", "src-1")
        .await;
    harness
        .submit("please add a dark mode to <#app-7> settings", "src-2")
        .await;

    harness
        .review
        .apply("msg-1", ReviewVerb::SendToBuild, REVIEWER)
        .await
        .expect("first");
    harness
        .review
        .apply("msg-2", ReviewVerb::SendToBuild, REVIEWER)
        .await
        .expect("second");

    assert_eq!(
        harness.tickets.require("msg-1").await.expect("ticket").status,
        TicketStatus::Building
    );
    assert_eq!(
        harness.tickets.require("msg-2").await.expect("ticket").status,
        TicketStatus::Queued
    );
}
