//! Reviewer verb scenarios against the full engine.

use buildboard::models::ticket::{RewardKind, TicketStatus};
use buildboard::review::verb::{ApprovalTier, ReviewVerb};
use buildboard::AppError;

use super::test_helpers::{
    Harness, HarnessOptions, AUTHOR, ORIGIN_CHANNEL, REVIEWER, REVIEW_CHANNEL,
};

#[tokio::test]
async fn approve_credits_reward_and_reports_artifact() {
    let harness = Harness::new().await;
    harness
        .submit("<#app-42> login crashes on submit", "src-1")
        .await;

    harness
        .review
        .apply("msg-1", ReviewVerb::Approve, REVIEWER)
        .await
        .expect("approve");

    let ticket = harness.tickets.require("msg-1").await.expect("ticket");
    assert_eq!(ticket.status, TicketStatus::Approved);
    assert!(ticket.reward_granted(RewardKind::Approval));

    let rows = harness.ledger.leaderboard().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].author_id, AUTHOR);
    assert_eq!(rows[0].total_credits, 50);

    let calls = harness.codegen.calls.lock().expect("lock");
    assert_eq!(calls.as_slice(), [("msg-1".to_owned(), ApprovalTier::Standard)]);

    let posts = harness.notifier.posts_to(REVIEW_CHANNEL);
    assert!(posts
        .iter()
        .any(|p| p.contains("Code review artifact ready for `msg-1`") && p.contains("review/msg-1")));
}

#[tokio::test]
async fn high_tier_approval_selects_the_high_tier() {
    let harness = Harness::new().await;
    harness
        .submit("<#app-42> login crashes on submit", "src-1")
        .await;

    harness
        .review
        .apply("msg-1", ReviewVerb::ApproveHighTier, REVIEWER)
        .await
        .expect("approve");

    let calls = harness.codegen.calls.lock().expect("lock");
    assert_eq!(calls[0].1, ApprovalTier::High);
}

#[tokio::test]
async fn approval_reward_is_paid_at_most_once() {
    let harness = Harness::new().await;
    harness
        .submit("<#app-42> login crashes on submit", "src-1")
        .await;
    harness
        .tickets
        .set_reward_granted("msg-1", RewardKind::Approval)
        .await
        .expect("flag");

    harness
        .review
        .apply("msg-1", ReviewVerb::Approve, REVIEWER)
        .await
        .expect("approve");

    assert!(harness.ledger.leaderboard().await.is_empty());
}

#[tokio::test]
async fn codegen_failure_leaves_ticket_approved_and_is_reported() {
    let harness = Harness::with_options(HarnessOptions {
        fail_codegen: true,
        ..HarnessOptions::default()
    })
    .await;
    harness
        .submit("<#app-42> login crashes on submit", "src-1")
        .await;

    harness
        .review
        .apply("msg-1", ReviewVerb::Approve, REVIEWER)
        .await
        .expect("approve succeeds despite generation failure");

    let ticket = harness.tickets.require("msg-1").await.expect("ticket");
    assert_eq!(ticket.status, TicketStatus::Approved);
    assert!(ticket.reward_granted(RewardKind::Approval));

    let posts = harness.notifier.posts_to(REVIEW_CHANNEL);
    assert!(posts.iter().any(|p| {
        p.contains("Code generation failed for `msg-1`")
            && p.contains("generation backend unavailable")
    }));
}

#[tokio::test]
async fn manual_writes_a_prompt_without_changing_status() {
    let harness = Harness::new().await;
    harness
        .submit("<#app-42> login crashes on submit", "src-1")
        .await;

    harness
        .review
        .apply("msg-1", ReviewVerb::Manual, REVIEWER)
        .await
        .expect("manual");

    let ticket = harness.tickets.require("msg-1").await.expect("ticket");
    assert_eq!(ticket.status, TicketStatus::Pending);

    let prompts = harness.prompts.fetch_unconsumed().await.expect("prompts");
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].handle, "msg-1");
    assert!(prompts[0].prompt_text.contains("app-42"));

    assert!(!harness.notifier.dms_to(AUTHOR).is_empty());
}

#[tokio::test]
async fn send_to_build_starts_immediately_when_idle() {
    let harness = Harness::new().await;
    harness
        .submit("<#app-42> login crashes on submit", "src-1")
        .await;

    harness
        .review
        .apply("msg-1", ReviewVerb::SendToBuild, REVIEWER)
        .await
        .expect("send to build");

    let ticket = harness.tickets.require("msg-1").await.expect("ticket");
    assert_eq!(ticket.status, TicketStatus::Building);

    let dms = harness.notifier.dms_to(AUTHOR);
    assert!(dms.iter().any(|m| m.contains("is now being built")));
}

#[tokio::test]
async fn send_to_build_queues_behind_the_current_build() {
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

    let second = harness.tickets.require("msg-2").await.expect("ticket");
    assert_eq!(second.status, TicketStatus::Queued);

    let dms = harness.notifier.dms_to(AUTHOR);
    assert!(dms.iter().any(|m| m.contains("queued for build at position 1")));
}

#[tokio::test]
async fn todo_parks_in_backlog_and_stays_reviewable() {
    let harness = Harness::new().await;
    harness
        .submit("<#app-42> login crashes on submit", "src-1")
        .await;

    // todo is open to anyone, not just reviewers.
    harness
        .review
        .apply("msg-1", ReviewVerb::Todo, "U_RANDOM")
        .await
        .expect("todo");
    assert_eq!(
        harness.tickets.require("msg-1").await.expect("ticket").status,
        TicketStatus::Backlog
    );

    harness
        .review
        .apply("msg-1", ReviewVerb::Approve, REVIEWER)
        .await
        .expect("backlog tickets are re-reviewable");
    assert_eq!(
        harness.tickets.require("msg-1").await.expect("ticket").status,
        TicketStatus::Approved
    );
}

#[tokio::test]
async fn needs_info_pings_the_author_in_the_origin_channel() {
    let harness = Harness::new().await;
    harness
        .submit("<#app-42> login crashes on submit", "src-1")
        .await;

    harness
        .review
        .apply("msg-1", ReviewVerb::NeedsInfo, "U_RANDOM")
        .await
        .expect("needs_info is open to anyone");

    assert_eq!(
        harness.tickets.require("msg-1").await.expect("ticket").status,
        TicketStatus::NeedsInfo
    );

    let posts = harness.notifier.posts_to(ORIGIN_CHANNEL);
    assert!(posts
        .iter()
        .any(|p| p.contains("<@U_AUTHOR>") && p.contains("needs more detail")));

    // The ticket can be picked up again once detail arrives.
    harness
        .review
        .apply("msg-1", ReviewVerb::Approve, REVIEWER)
        .await
        .expect("re-review");
}

#[tokio::test]
async fn reject_is_terminal() {
    let harness = Harness::new().await;
    harness
        .submit("<#app-42> login crashes on submit", "src-1")
        .await;

    harness
        .review
        .apply("msg-1", ReviewVerb::Reject, REVIEWER)
        .await
        .expect("reject");

    assert_eq!(
        harness.tickets.require("msg-1").await.expect("ticket").status,
        TicketStatus::Rejected
    );
    assert!(harness
        .notifier
        .dms_to(AUTHOR)
        .iter()
        .any(|m| m.contains("was rejected")));

    let err = harness
        .review
        .apply("msg-1", ReviewVerb::Approve, REVIEWER)
        .await
        .expect_err("terminal");
    assert!(matches!(err, AppError::InvalidTransition(_)));
}

#[tokio::test]
async fn ship_pays_the_bonus_on_top_of_the_approval() {
    let harness = Harness::new().await;
    harness
        .submit("<#app-42> login crashes on submit", "src-1")
        .await;

    harness
        .review
        .apply("msg-1", ReviewVerb::Approve, REVIEWER)
        .await
        .expect("approve");
    harness
        .review
        .apply("msg-1", ReviewVerb::Ship, REVIEWER)
        .await
        .expect("ship");

    let ticket = harness.tickets.require("msg-1").await.expect("ticket");
    assert_eq!(ticket.status, TicketStatus::Shipped);
    assert!(ticket.reward_granted(RewardKind::ShipBonus));

    let rows = harness.ledger.leaderboard().await;
    assert_eq!(rows[0].total_credits, 150);
    assert_eq!(rows[0].contribution_count, 2);

    assert!(harness
        .notifier
        .dms_to(AUTHOR)
        .iter()
        .any(|m| m.contains("has shipped")));
}

#[tokio::test]
async fn ship_requires_an_approved_ticket() {
    let harness = Harness::new().await;
    harness
        .submit("<#app-42> login crashes on submit", "src-1")
        .await;

    let err = harness
        .review
        .apply("msg-1", ReviewVerb::Ship, REVIEWER)
        .await
        .expect_err("must fail");
    assert!(matches!(err, AppError::InvalidTransition(_)));
}

#[tokio::test]
async fn privileged_verbs_reject_non_reviewers() {
    let harness = Harness::new().await;
    harness
        .submit("<#app-42> login crashes on submit", "src-1")
        .await;

    let err = harness
        .review
        .apply("msg-1", ReviewVerb::Approve, "U_RANDOM")
        .await
        .expect_err("must fail");
    assert!(matches!(err, AppError::Unauthorized(_)));

    // Nothing happened: no status change, no reward, no generation call.
    assert_eq!(
        harness.tickets.require("msg-1").await.expect("ticket").status,
        TicketStatus::Pending
    );
    assert!(harness.ledger.leaderboard().await.is_empty());
    assert!(harness.codegen.calls.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn unknown_handle_is_not_found() {
    let harness = Harness::new().await;

    let err = harness
        .review
        .apply("msg-404", ReviewVerb::Approve, REVIEWER)
        .await
        .expect_err("must fail");
    assert!(matches!(err, AppError::NotFound(_)));
}
