//! Unit tests for the durable FIFO build queue.

use std::sync::Arc;

use buildboard::models::queue::QueueEntry;
use buildboard::persistence::db;
use buildboard::persistence::queue_repo::QueueRepo;
use buildboard::queue::{BuildQueue, HandOff};
use chrono::Utc;

fn entry(handle: &str, title: &str) -> QueueEntry {
    QueueEntry {
        handle: handle.to_owned(),
        title: title.to_owned(),
        app: "app-42".to_owned(),
        enqueued_at: Utc::now(),
    }
}

async fn queue() -> BuildQueue {
    let pool = db::connect_memory().await.expect("db");
    BuildQueue::new(QueueRepo::new(Arc::new(pool)))
}

#[tokio::test]
async fn hand_off_starts_when_idle() {
    let queue = queue().await;

    let outcome = queue.hand_off(entry("msg-1", "First")).await;
    assert_eq!(outcome, HandOff::Started);

    let snapshot = queue.status().await;
    assert!(snapshot.busy);
    assert_eq!(snapshot.current_title.as_deref(), Some("First"));
    assert_eq!(snapshot.queue_length, 0);
}

#[tokio::test]
async fn hand_off_queues_when_busy() {
    let queue = queue().await;

    queue.hand_off(entry("msg-1", "First")).await;
    let outcome = queue.hand_off(entry("msg-2", "Second")).await;
    assert_eq!(outcome, HandOff::Queued(1));

    let outcome = queue.hand_off(entry("msg-3", "Third")).await;
    assert_eq!(outcome, HandOff::Queued(2));

    let snapshot = queue.status().await;
    assert!(snapshot.busy);
    assert_eq!(snapshot.queue_length, 2);
}

#[tokio::test]
async fn dispatch_pops_in_fifo_order() {
    let queue = queue().await;

    queue.hand_off(entry("msg-1", "First")).await;
    queue.hand_off(entry("msg-2", "Second")).await;
    queue.hand_off(entry("msg-3", "Third")).await;

    queue.complete().await;
    let next = queue.dispatch().await.expect("queued entry");
    assert_eq!(next.handle, "msg-2");

    queue.complete().await;
    let next = queue.dispatch().await.expect("queued entry");
    assert_eq!(next.handle, "msg-3");

    queue.complete().await;
    assert!(queue.dispatch().await.is_none());
    assert!(!queue.status().await.busy);
}

#[tokio::test]
async fn dispatch_while_current_is_ignored() {
    let queue = queue().await;

    queue.hand_off(entry("msg-1", "First")).await;
    queue.hand_off(entry("msg-2", "Second")).await;

    assert!(queue.dispatch().await.is_none());
    assert_eq!(queue.current_handle().await.as_deref(), Some("msg-1"));
    assert_eq!(queue.status().await.queue_length, 1);
}

#[tokio::test]
async fn hand_off_after_a_failed_build_joins_the_tail() {
    let queue = queue().await;

    queue.hand_off(entry("msg-1", "First")).await;
    queue.hand_off(entry("msg-2", "Second")).await;
    queue.fail("worker crashed").await;

    // The worker slot is empty but msg-2 is still waiting; a new
    // hand-off must not jump ahead of it.
    let outcome = queue.hand_off(entry("msg-3", "Third")).await;
    assert_eq!(outcome, HandOff::Queued(2));

    let next = queue.dispatch().await.expect("queued entry");
    assert_eq!(next.handle, "msg-2");
}

#[tokio::test]
async fn hand_off_between_completion_and_dispatch_keeps_fifo() {
    let queue = queue().await;

    queue.hand_off(entry("msg-1", "First")).await;
    queue.hand_off(entry("msg-2", "Second")).await;
    queue.complete().await;

    let outcome = queue.hand_off(entry("msg-3", "Third")).await;
    assert_eq!(outcome, HandOff::Queued(2));
    assert_eq!(queue.dispatch().await.expect("queued entry").handle, "msg-2");
}

#[tokio::test]
async fn enqueue_returns_one_based_positions() {
    let queue = queue().await;

    assert_eq!(queue.enqueue(entry("msg-1", "First")).await, 1);
    assert_eq!(queue.enqueue(entry("msg-2", "Second")).await, 2);

    // Enqueued entries wait until explicitly dispatched.
    let snapshot = queue.status().await;
    assert!(!snapshot.busy);
    assert_eq!(snapshot.queue_length, 2);
    assert_eq!(queue.dispatch().await.expect("head").handle, "msg-1");
}

#[tokio::test]
async fn fail_records_last_error_and_complete_clears_it() {
    let queue = queue().await;

    queue.hand_off(entry("msg-1", "First")).await;
    queue.fail("worker crashed").await;

    let snapshot = queue.status().await;
    assert!(!snapshot.busy);
    assert_eq!(snapshot.last_error.as_deref(), Some("worker crashed"));

    queue.hand_off(entry("msg-2", "Second")).await;
    queue.complete().await;
    assert!(queue.status().await.last_error.is_none());
}

#[tokio::test]
async fn recovers_persisted_state() {
    let pool = Arc::new(db::connect_memory().await.expect("db"));
    let queue = BuildQueue::new(QueueRepo::new(Arc::clone(&pool)));

    queue.hand_off(entry("msg-1", "First")).await;
    queue.hand_off(entry("msg-2", "Second")).await;

    let recovered = BuildQueue::recover(QueueRepo::new(pool))
        .await
        .expect("recover");
    let snapshot = recovered.status().await;
    assert!(snapshot.busy);
    assert_eq!(snapshot.current_title.as_deref(), Some("First"));
    assert_eq!(snapshot.queue_length, 1);
    assert_eq!(recovered.current_handle().await.as_deref(), Some("msg-1"));
}
