//! Daily profit distribution

use crate::balance::BalanceAggregator;
use crate::config::ProfitSchedule;
use crate::error::CoreResult;
use crate::notify::{NotificationKind, NotificationSink};
use crate::store::{DateRange, TransactionStore, UserStore};
use crate::types::{BalanceBucket, Page, Transaction, User, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

/// Tally for one processed page
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageOutcome {
    /// Users that received a profit row
    pub processed: u64,
    /// Users skipped: already settled this period, or zero profit
    pub skipped: u64,
    /// Users whose settlement failed; the page continued past them
    pub failed: u64,
    /// Users seen on the page; zero means the page was past the end
    pub scanned: u64,
}

/// Applies the daily tiered profit to pages of invested users
///
/// Each run consumes an explicit [`ProfitSchedule`] and a period key. At
/// most one profit row is written per user per period: the row carries
/// the period key and settlement is skipped when one already exists, so
/// re-running a period (after a crash, or by accident) never double-pays.
pub struct DistributionEngine {
    users: Arc<dyn UserStore>,
    transactions: Arc<dyn TransactionStore>,
    balances: Arc<BalanceAggregator>,
    notifier: Arc<dyn NotificationSink>,
}

impl DistributionEngine {
    pub fn new(
        users: Arc<dyn UserStore>,
        transactions: Arc<dyn TransactionStore>,
        balances: Arc<BalanceAggregator>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            users,
            transactions,
            balances,
            notifier,
        }
    }

    /// Settle one page of active invested users
    ///
    /// Per-user failures are logged and tallied; the page keeps going.
    pub async fn run_page(
        &self,
        page: Page,
        schedule: &ProfitSchedule,
        period_key: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<PageOutcome> {
        schedule.validate()?;

        let users = self.users.active_invested(page).await?;
        let mut outcome = PageOutcome {
            scanned: users.len() as u64,
            ..PageOutcome::default()
        };

        for user in users {
            match self.settle_user(&user, schedule, period_key, now).await {
                Ok(true) => outcome.processed += 1,
                Ok(false) => outcome.skipped += 1,
                Err(error) => {
                    warn!(
                        user_id = %user.user_id,
                        period_key,
                        error = %error,
                        "profit settlement failed, continuing page"
                    );
                    outcome.failed += 1;
                }
            }
        }

        info!(
            page = page.page,
            period_key,
            processed = outcome.processed,
            skipped = outcome.skipped,
            failed = outcome.failed,
            "distribution page settled"
        );
        Ok(outcome)
    }

    /// Settle a single user; returns false when skipped
    async fn settle_user(
        &self,
        user: &User,
        schedule: &ProfitSchedule,
        period_key: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<bool> {
        if self
            .transactions
            .profit_exists(&user.user_id, period_key)
            .await?
        {
            return Ok(false);
        }

        // Tier presence is part of the page filter; a user losing it
        // between the scan and here just skips the period.
        let Some(tier) = user.tier else {
            return Ok(false);
        };
        let percentage = schedule.rate(tier.level)?;

        // Equity is sourced from the ledger, not the cached fields, so a
        // drifted cache cannot over- or under-pay.
        let equity = self
            .balances
            .equity_balance(&user.user_id, DateRange::all())
            .await?;
        let applied = equity * percentage / Decimal::ONE_HUNDRED;
        if applied <= Decimal::ZERO {
            return Ok(false);
        }

        self.transactions
            .append(Transaction::profit(
                user.user_id.clone(),
                equity,
                percentage,
                applied,
                period_key,
                now,
            ))
            .await?;
        self.users
            .adjust_balance(&user.user_id, BalanceBucket::Profit, applied)
            .await?;
        self.notifier
            .notify(
                &user.user_id,
                NotificationKind::ProfitApplied,
                &format!("Daily profit of {applied} applied"),
            )
            .await;

        Ok(true)
    }

    /// Settle one user outside a page scan (used by tests and admin
    /// tooling)
    pub async fn settle_one(
        &self,
        user_id: &UserId,
        schedule: &ProfitSchedule,
        period_key: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<bool> {
        let Some(user) = self.users.get(user_id).await? else {
            return Ok(false);
        };
        if !user.is_invested() {
            return Ok(false);
        }
        self.settle_user(&user, schedule, period_key, now).await
    }
}
