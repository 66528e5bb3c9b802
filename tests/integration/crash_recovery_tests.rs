//! Restart recovery: durable state survives a process boundary.

use std::sync::Arc;

use buildboard::ledger::RewardLedger;
use buildboard::models::queue::QueueEntry;
use buildboard::models::ticket::{RewardKind, Ticket, TicketKind, TicketPayload, TicketStatus};
use buildboard::persistence::db;
use buildboard::persistence::ledger_repo::LedgerRepo;
use buildboard::persistence::queue_repo::QueueRepo;
use buildboard::persistence::ticket_repo::TicketRepo;
use buildboard::queue::BuildQueue;
use chrono::Utc;

fn entry(handle: &str, title: &str) -> QueueEntry {
    QueueEntry {
        handle: handle.to_owned(),
        title: title.to_owned(),
        app: "app-42".to_owned(),
        enqueued_at: Utc::now(),
    }
}

#[tokio::test]
async fn queue_survives_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("buildboard.db");

    {
        let pool = Arc::new(db::connect(&path).await.expect("db"));
        let queue = BuildQueue::new(QueueRepo::new(Arc::clone(&pool)));
        queue.hand_off(entry("msg-1", "First")).await;
        queue.hand_off(entry("msg-2", "Second")).await;
        queue.hand_off(entry("msg-3", "Third")).await;
        pool.close().await;
    }

    let pool = Arc::new(db::connect(&path).await.expect("db"));
    let queue = BuildQueue::recover(QueueRepo::new(pool))
        .await
        .expect("recover");

    let snapshot = queue.status().await;
    assert!(snapshot.busy);
    assert_eq!(snapshot.current_title.as_deref(), Some("First"));
    assert_eq!(snapshot.queue_length, 2);

    // FIFO order survived too.
    queue.complete().await;
    assert_eq!(queue.dispatch().await.expect("next").handle, "msg-2");
}

#[tokio::test]
async fn ledger_survives_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("buildboard.db");

    {
        let pool = Arc::new(db::connect(&path).await.expect("db"));
        let ledger = RewardLedger::new(LedgerRepo::new(Arc::clone(&pool)));
        ledger
            .credit("U_A", "Alice", 50, RewardKind::Approval)
            .await;
        ledger
            .credit("U_A", "Alice", 100, RewardKind::ShipBonus)
            .await;
        ledger.credit("U_B", "Bob", 50, RewardKind::Approval).await;
        pool.close().await;
    }

    let pool = Arc::new(db::connect(&path).await.expect("db"));
    let ledger = RewardLedger::recover(LedgerRepo::new(pool))
        .await
        .expect("recover");

    let rows = ledger.leaderboard().await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].author_id, "U_A");
    assert_eq!(rows[0].total_credits, 150);
    assert_eq!(rows[1].total_credits, 50);
}

#[tokio::test]
async fn tickets_survive_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("buildboard.db");

    {
        let pool = Arc::new(db::connect(&path).await.expect("db"));
        let tickets = TicketRepo::new(pool.clone());
        let ticket = Ticket::new(
            "msg-1".to_owned(),
            TicketKind::Bug,
            "app-42".to_owned(),
            TicketPayload {
                title: "Login crashes".to_owned(),
                description: "Login crashes on submit".to_owned(),
                priority: None,
            },
            "U_AUTHOR".to_owned(),
            "Author".to_owned(),
            "C_ORIGIN".to_owned(),
        );
        tickets.create(&ticket).await.expect("create");
        tickets
            .update_status("msg-1", TicketStatus::Queued)
            .await
            .expect("update");
        pool.close().await;
    }

    let pool = Arc::new(db::connect(&path).await.expect("db"));
    let tickets = TicketRepo::new(pool);
    let ticket = tickets.require("msg-1").await.expect("ticket");
    assert_eq!(ticket.status, TicketStatus::Queued);
    assert_eq!(ticket.title, "Login crashes");
}
