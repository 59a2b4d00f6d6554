//! Rank engine tests

mod common;

use chrono::Utc;
use common::{days_ago, TestContext};
use rust_decimal::Decimal;
use upline_core::error::CoreError;
use upline_core::notify::NotificationKind;
use upline_core::rank::RankEngine;
use upline_core::types::{ApprovalStatus, RankId, UserId};

/// Sponsor with three directs whose deposits land inside the Builder
/// band (10k..15k sales, 3 directs, rewards 300..500)
async fn builder_downline(ctx: &TestContext, deposit_each: i64, at: chrono::DateTime<chrono::Utc>) {
    ctx.add_user_at("user:sponsor", None, at).await;
    for i in 0..3 {
        let id = format!("user:d{i}");
        ctx.add_user_at(&id, Some("user:sponsor"), at).await;
        ctx.approved_deposit(&id, Decimal::new(deposit_each, 0), at)
            .await;
    }
}

#[tokio::test]
async fn test_no_period_without_downline_activity() {
    let ctx = TestContext::new().await;
    ctx.add_user("user:sponsor", None).await;
    ctx.add_user("user:child", Some("user:sponsor")).await;

    // A pending (never approved) deposit does not start the period
    ctx.ledger
        .create_deposit(&UserId::new("user:child"), Decimal::new(100, 0), Utc::now())
        .await
        .unwrap();

    let info = ctx
        .rank_engine
        .rank_info(&UserId::new("user:sponsor"))
        .await
        .unwrap();
    assert!(info.is_none());
}

#[tokio::test]
async fn test_period_starts_at_earliest_downline_deposit() {
    let ctx = TestContext::new().await;
    ctx.add_user_at("user:sponsor", None, days_ago(50)).await;
    ctx.add_user_at("user:a", Some("user:sponsor"), days_ago(50))
        .await;
    ctx.add_user_at("user:b", Some("user:sponsor"), days_ago(50))
        .await;

    ctx.approved_deposit("user:b", Decimal::new(100, 0), days_ago(20))
        .await;
    let earliest = ctx
        .approved_deposit("user:a", Decimal::new(100, 0), days_ago(40))
        .await;

    let info = ctx
        .rank_engine
        .rank_info(&UserId::new("user:sponsor"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(info.period_start, earliest.created_at);
}

#[tokio::test]
async fn test_rank_info_counts_and_sales() {
    let ctx = TestContext::new().await;
    builder_downline(&ctx, 4_000, days_ago(10)).await;
    ctx.add_user_at("user:grand", Some("user:d0"), days_ago(9)).await;

    let info = ctx
        .rank_engine
        .rank_info(&UserId::new("user:sponsor"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(info.direct_count, 3);
    assert_eq!(info.indirect_count, 4);
    assert_eq!(info.sales, Decimal::new(12_000, 0));
    let rank = info.rank.expect("builder band should match");
    assert_eq!(rank.rank_id, RankId::new("rank:builder"));
}

#[tokio::test]
async fn test_rank_requires_direct_referrals() {
    let ctx = TestContext::new().await;
    // One direct delivering builder-band sales alone: sales match, directs do not
    ctx.add_user_at("user:sponsor", None, days_ago(10)).await;
    ctx.add_user_at("user:whale", Some("user:sponsor"), days_ago(10))
        .await;
    ctx.approved_deposit("user:whale", Decimal::new(12_000, 0), days_ago(10))
        .await;

    let info = ctx
        .rank_engine
        .rank_info(&UserId::new("user:sponsor"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(info.sales, Decimal::new(12_000, 0));
    // Builder needs 3 directs and Associate 2; one whale is not enough
    assert!(info.rank.is_none());
}

#[tokio::test]
async fn test_sales_above_top_band_match_top_rank() {
    let ctx = TestContext::new().await;
    ctx.add_user_at("user:sponsor", None, days_ago(10)).await;
    for i in 0..8 {
        let id = format!("user:d{i}");
        ctx.add_user_at(&id, Some("user:sponsor"), days_ago(10)).await;
        ctx.approved_deposit(&id, Decimal::new(25_000, 0), days_ago(10))
            .await;
    }

    let info = ctx
        .rank_engine
        .rank_info(&UserId::new("user:sponsor"))
        .await
        .unwrap()
        .unwrap();
    // 200k sales exceeds the Executive band top; still Executive
    let rank = info.rank.expect("top band should match");
    assert_eq!(rank.rank_id, RankId::new("rank:executive"));
    // And the payout clamps to the band's reward ceiling
    assert_eq!(rank.interpolate_reward(info.sales), Decimal::new(5_000, 0));
}

#[tokio::test]
async fn test_claim_interpolates_and_credits_at_creation() {
    let ctx = TestContext::new().await;
    builder_downline(&ctx, 4_000, days_ago(10)).await;

    let reward = ctx
        .rank_engine
        .claim(&UserId::new("user:sponsor"), Utc::now())
        .await
        .unwrap();

    // sales 12000 in [10000, 15000] -> 300 + 200 * 2/5 = 380
    assert_eq!(reward.amount, Decimal::new(380, 0));
    assert!(reward.is_claimed);
    assert_eq!(reward.status, ApprovalStatus::Pending);

    // Credited immediately at creation, before any admin approval
    assert_eq!(
        ctx.user("user:sponsor").await.reward_balance,
        Decimal::new(380, 0)
    );
    assert_eq!(
        ctx.balances
            .reward_balance(&UserId::new("user:sponsor"))
            .await
            .unwrap(),
        Decimal::new(380, 0)
    );
    assert_eq!(ctx.notifier.count_of(NotificationKind::RankReward), 1);

    // Approval afterwards is a pure status change
    ctx.ledger
        .approve_reward(&reward.reward_id, Utc::now())
        .await
        .unwrap();
    assert_eq!(
        ctx.user("user:sponsor").await.reward_balance,
        Decimal::new(380, 0)
    );
}

#[tokio::test]
async fn test_claim_without_period_fails() {
    let ctx = TestContext::new().await;
    ctx.add_user("user:sponsor", None).await;

    let err = ctx
        .rank_engine
        .claim(&UserId::new("user:sponsor"), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::RankPeriodNotStarted { .. }));
}

#[tokio::test]
async fn test_claim_without_rank_fails() {
    let ctx = TestContext::new().await;
    ctx.add_user_at("user:sponsor", None, days_ago(10)).await;
    ctx.add_user_at("user:only", Some("user:sponsor"), days_ago(10))
        .await;
    ctx.approved_deposit("user:only", Decimal::new(100, 0), days_ago(10))
        .await;

    let err = ctx
        .rank_engine
        .claim(&UserId::new("user:sponsor"), Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::RankNotReached { .. }));
}

#[tokio::test]
async fn test_period_gates_automatic_evaluation() {
    let ctx = TestContext::new().await;
    builder_downline(&ctx, 4_000, days_ago(10)).await;

    // 10 days in: nothing to evaluate yet
    let outcome = ctx
        .rank_engine
        .evaluate(&UserId::new("user:sponsor"), Utc::now())
        .await
        .unwrap();
    assert!(outcome.is_none());
    assert!(RankEngine::period_elapsed(days_ago(31), Utc::now()));
    assert!(!RankEngine::period_elapsed(days_ago(29), Utc::now()));
}

#[tokio::test]
async fn test_elapsed_period_auto_creates_reward_and_rolls_period() {
    let ctx = TestContext::new().await;
    builder_downline(&ctx, 4_000, days_ago(35)).await;

    let reward = ctx
        .rank_engine
        .evaluate(&UserId::new("user:sponsor"), Utc::now())
        .await
        .unwrap()
        .expect("elapsed period should produce a reward");
    assert!(!reward.is_claimed);
    assert_eq!(reward.amount, Decimal::new(380, 0));

    // The unclaimed reward anchors the next period at its own timestamp
    let info = ctx
        .rank_engine
        .rank_info(&UserId::new("user:sponsor"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(info.period_start, reward.created_at);
    // The old downline deposits predate the new period
    assert_eq!(info.sales, Decimal::ZERO);
}

#[tokio::test]
async fn test_period_consumed_even_without_rank() {
    let ctx = TestContext::new().await;
    ctx.add_user_at("user:sponsor", None, days_ago(40)).await;
    ctx.add_user_at("user:only", Some("user:sponsor"), days_ago(40))
        .await;
    ctx.approved_deposit("user:only", Decimal::new(100, 0), days_ago(40))
        .await;

    let reward = ctx
        .rank_engine
        .evaluate(&UserId::new("user:sponsor"), Utc::now())
        .await
        .unwrap()
        .expect("elapsed period should be consumed");
    assert!(reward.rank_id.is_none());
    assert_eq!(reward.amount, Decimal::ZERO);
    // Zero-amount rewards never touch the balance
    assert_eq!(ctx.user("user:sponsor").await.reward_balance, Decimal::ZERO);
}

#[tokio::test]
async fn test_claimed_reward_round_trip_keeps_amount() {
    let ctx = TestContext::new().await;
    builder_downline(&ctx, 4_000, days_ago(35)).await;

    let reward = ctx
        .rank_engine
        .evaluate(&UserId::new("user:sponsor"), Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert!(!reward.is_claimed);

    let claimed = ctx
        .stores
        .rewards
        .mark_claimed(&reward.reward_id, Utc::now())
        .await
        .unwrap();
    assert!(claimed.is_claimed);
    assert_eq!(claimed.amount, reward.amount);

    let loaded = ctx
        .stores
        .rewards
        .get(&reward.reward_id)
        .await
        .unwrap()
        .unwrap();
    assert!(loaded.is_claimed);
    assert_eq!(loaded.amount, reward.amount);
}
