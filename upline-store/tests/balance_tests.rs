//! Balance aggregation tests

mod common;

use chrono::Utc;
use common::{days_ago, TestContext};
use rust_decimal::Decimal;
use upline_core::error::CoreError;
use upline_core::store::DateRange;
use upline_core::types::{InvestmentLevel, TierRef, UserId, WithdrawalBucket};

#[tokio::test]
async fn test_unknown_user_has_no_money() {
    let ctx = TestContext::new().await;
    let balances = ctx
        .balances
        .balances(&UserId::new("user:ghost"))
        .await
        .unwrap();
    assert_eq!(balances, upline_core::balance::Balances::zero());
}

#[tokio::test]
async fn test_deposit_balance_from_approved_deposits() {
    let ctx = TestContext::with_fee(Decimal::new(5, 2)).await;
    ctx.add_user("user:a", None).await;

    ctx.approved_deposit("user:a", Decimal::new(1000, 0), Utc::now())
        .await;
    // A pending deposit contributes nothing
    ctx.ledger
        .create_deposit(&UserId::new("user:a"), Decimal::new(500, 0), Utc::now())
        .await
        .unwrap();

    let deposit = ctx
        .balances
        .deposit_balance(&UserId::new("user:a"), DateRange::all())
        .await
        .unwrap();
    assert_eq!(deposit, Decimal::new(950, 0));
}

#[tokio::test]
async fn test_pending_withdrawal_subtracts_original_amount() {
    let ctx = TestContext::with_fee(Decimal::new(5, 2)).await;
    ctx.add_user("user:a", None).await;
    ctx.approved_deposit("user:a", Decimal::new(1000, 0), Utc::now())
        .await;

    let withdrawal = ctx
        .ledger
        .create_withdrawal(
            &UserId::new("user:a"),
            Decimal::new(200, 0),
            WithdrawalBucket::Deposit,
            Utc::now(),
        )
        .await
        .unwrap();

    // 950 net deposit minus the full 200 pending hold
    let deposit = ctx
        .balances
        .deposit_balance(&UserId::new("user:a"), DateRange::all())
        .await
        .unwrap();
    assert_eq!(deposit, Decimal::new(750, 0));
    // The cached field was decremented synchronously and matches
    assert_eq!(ctx.user("user:a").await.deposit_balance, Decimal::new(750, 0));

    // Approval changes nothing further
    ctx.ledger
        .approve(&withdrawal.transaction_id, Utc::now())
        .await
        .unwrap();
    let deposit = ctx
        .balances
        .deposit_balance(&UserId::new("user:a"), DateRange::all())
        .await
        .unwrap();
    assert_eq!(deposit, Decimal::new(750, 0));
    assert_eq!(ctx.user("user:a").await.deposit_balance, Decimal::new(750, 0));
}

#[tokio::test]
async fn test_rejected_withdrawal_refunds_bucket() {
    let ctx = TestContext::new().await;
    ctx.add_user("user:a", None).await;
    ctx.approved_deposit("user:a", Decimal::new(1000, 0), Utc::now())
        .await;

    let withdrawal = ctx
        .ledger
        .create_withdrawal(
            &UserId::new("user:a"),
            Decimal::new(300, 0),
            WithdrawalBucket::Deposit,
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(ctx.user("user:a").await.deposit_balance, Decimal::new(700, 0));

    ctx.ledger
        .reject(&withdrawal.transaction_id, Utc::now())
        .await
        .unwrap();

    // Hold returned, and the rejected row no longer counts in the ledger sum
    assert_eq!(ctx.user("user:a").await.deposit_balance, Decimal::new(1000, 0));
    let deposit = ctx
        .balances
        .deposit_balance(&UserId::new("user:a"), DateRange::all())
        .await
        .unwrap();
    assert_eq!(deposit, Decimal::new(1000, 0));
}

#[tokio::test]
async fn test_withdrawal_beyond_available_rejected() {
    let ctx = TestContext::new().await;
    ctx.add_user("user:a", None).await;
    ctx.approved_deposit("user:a", Decimal::new(500, 0), Utc::now())
        .await;

    let err = ctx
        .ledger
        .create_withdrawal(
            &UserId::new("user:a"),
            Decimal::new(501, 0),
            WithdrawalBucket::Deposit,
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InsufficientBalance { .. }));

    // Nothing was decremented and no hold exists
    assert_eq!(ctx.user("user:a").await.deposit_balance, Decimal::new(500, 0));

    // Draining exactly the available amount is allowed, to zero not below
    ctx.ledger
        .create_withdrawal(
            &UserId::new("user:a"),
            Decimal::new(500, 0),
            WithdrawalBucket::Deposit,
            Utc::now(),
        )
        .await
        .unwrap();
    let deposit = ctx
        .balances
        .deposit_balance(&UserId::new("user:a"), DateRange::all())
        .await
        .unwrap();
    assert_eq!(deposit, Decimal::ZERO);
}

#[tokio::test]
async fn test_profit_bucket_withdrawal_checked_against_profit() {
    let ctx = TestContext::new().await;
    ctx.add_user("user:a", None).await;
    ctx.approved_deposit("user:a", Decimal::new(1000, 0), Utc::now())
        .await;

    // No profit yet: even with a fat deposit balance the profit bucket is empty
    let err = ctx
        .ledger
        .create_withdrawal(
            &UserId::new("user:a"),
            Decimal::new(1, 0),
            WithdrawalBucket::Profit,
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InsufficientBalance { .. }));
}

#[tokio::test]
async fn test_credit_balance_is_graph_derived() {
    let ctx = TestContext::bare().await;

    // One program: 8% at depth 1, 7% at depth 2
    let program = upline_core::types::Program::new(
        InvestmentLevel::A,
        vec![
            upline_core::types::ProgramTier {
                sub_level: 1,
                investment: Decimal::new(100, 0),
                profit_percent_from: Decimal::ONE,
                profit_percent_to: Decimal::TWO,
                credit_percentage: Decimal::new(8, 0),
                direct_referrals_required: 0,
            },
            upline_core::types::ProgramTier {
                sub_level: 2,
                investment: Decimal::new(500, 0),
                profit_percent_from: Decimal::ONE,
                profit_percent_to: Decimal::TWO,
                credit_percentage: Decimal::new(7, 0),
                direct_referrals_required: 0,
            },
        ],
    );
    ctx.stores.programs.put(program).await.unwrap();

    ctx.add_user("user:sponsor", None).await;
    ctx.add_user("user:child", Some("user:sponsor")).await;
    ctx.add_user("user:grandchild", Some("user:child")).await;
    ctx.set_tier("user:sponsor", TierRef::new(InvestmentLevel::A, 1))
        .await;

    ctx.approved_deposit("user:child", Decimal::new(1000, 0), Utc::now())
        .await;
    ctx.approved_deposit("user:grandchild", Decimal::new(500, 0), Utc::now())
        .await;

    let credit = ctx
        .balances
        .credit_balance(&UserId::new("user:sponsor"), DateRange::all())
        .await
        .unwrap();
    // 1000 * 8% + 500 * 7%
    assert_eq!(credit, Decimal::new(115, 0));

    // Equity folds the graph-derived credit together with deposits
    let equity = ctx
        .balances
        .equity_balance(&UserId::new("user:sponsor"), DateRange::all())
        .await
        .unwrap();
    assert_eq!(equity, Decimal::new(115, 0));
}

#[tokio::test]
async fn test_credit_balance_zero_without_tier() {
    let ctx = TestContext::new().await;
    ctx.add_user("user:sponsor", None).await;
    ctx.add_user("user:child", Some("user:sponsor")).await;
    // The child deposit retiers the child, not the sponsor
    ctx.approved_deposit("user:child", Decimal::new(1000, 0), Utc::now())
        .await;
    ctx.stores
        .users
        .set_tier(&UserId::new("user:sponsor"), None)
        .await
        .unwrap();

    let credit = ctx
        .balances
        .credit_balance(&UserId::new("user:sponsor"), DateRange::all())
        .await
        .unwrap();
    assert_eq!(credit, Decimal::ZERO);
}

#[tokio::test]
async fn test_date_range_bounds_deposit_balance() {
    let ctx = TestContext::new().await;
    ctx.add_user_at("user:a", None, days_ago(60)).await;
    ctx.approved_deposit("user:a", Decimal::new(400, 0), days_ago(45))
        .await;
    ctx.approved_deposit("user:a", Decimal::new(600, 0), days_ago(5))
        .await;

    let all = ctx
        .balances
        .deposit_balance(&UserId::new("user:a"), DateRange::all())
        .await
        .unwrap();
    assert_eq!(all, Decimal::new(1000, 0));

    let recent = ctx
        .balances
        .deposit_balance(&UserId::new("user:a"), DateRange::since(days_ago(30)))
        .await
        .unwrap();
    assert_eq!(recent, Decimal::new(600, 0));
}

#[tokio::test]
async fn test_account_balance_is_profit_plus_deposit() {
    let ctx = TestContext::new().await;
    ctx.add_user("user:a", None).await;
    ctx.approved_deposit("user:a", Decimal::new(1000, 0), Utc::now())
        .await;

    let schedule = test_schedule();
    ctx.distribution
        .settle_one(&UserId::new("user:a"), &schedule, "2024-03-01", Utc::now())
        .await
        .unwrap();

    let balances = ctx.balances.balances(&UserId::new("user:a")).await.unwrap();
    assert!(balances.profit > Decimal::ZERO);
    assert_eq!(balances.account, balances.profit + balances.deposit);
    assert_eq!(balances.equity, balances.credit + balances.deposit);
}

fn test_schedule() -> upline_core::config::ProfitSchedule {
    let mut rates = std::collections::HashMap::new();
    for level in InvestmentLevel::all() {
        rates.insert(level, Decimal::ONE);
    }
    upline_core::config::ProfitSchedule::new("v-test", days_ago(365), rates)
}
