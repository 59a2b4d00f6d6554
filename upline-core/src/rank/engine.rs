//! Rank evaluation state machine

use crate::balance::BalanceAggregator;
use crate::constants::{MAX_REFERRAL_DEPTH, RANK_PERIOD_DAYS};
use crate::error::{CoreError, CoreResult};
use crate::graph::{ReferralAggregator, ReferralFilter};
use crate::notify::{NotificationKind, NotificationSink};
use crate::store::{DateRange, RankStore, RewardStore, TransactionStore, UserStore};
use crate::types::{
    ApprovalStatus, BalanceBucket, Rank, Reward, RewardId, UserId,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Snapshot of a user's current rank period
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankInfo {
    pub period_start: DateTime<Utc>,
    pub direct_count: u64,
    pub indirect_count: u64,
    pub sales: Decimal,
    /// Highest rank matched this period, if any
    pub rank: Option<Rank>,
}

/// Evaluates rank periods and writes reward records
pub struct RankEngine {
    users: Arc<dyn UserStore>,
    transactions: Arc<dyn TransactionStore>,
    rewards: Arc<dyn RewardStore>,
    ranks: Arc<dyn RankStore>,
    referrals: ReferralAggregator,
    balances: Arc<BalanceAggregator>,
    notifier: Arc<dyn NotificationSink>,
}

impl RankEngine {
    pub fn new(
        users: Arc<dyn UserStore>,
        transactions: Arc<dyn TransactionStore>,
        rewards: Arc<dyn RewardStore>,
        ranks: Arc<dyn RankStore>,
        balances: Arc<BalanceAggregator>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let referrals = ReferralAggregator::new(users.clone());
        Self {
            users,
            transactions,
            rewards,
            ranks,
            referrals,
            balances,
            notifier,
        }
    }

    /// Whether a period that started at `start` is eligible for
    /// automatic evaluation
    pub fn period_elapsed(start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        (now - start).num_days() >= RANK_PERIOD_DAYS
    }

    /// Current rank period snapshot for a user
    ///
    /// Returns `None` when no period can be established: no unclaimed
    /// reward exists and no descendant has an approved deposit yet.
    pub async fn rank_info(&self, user_id: &UserId) -> CoreResult<Option<RankInfo>> {
        let Some(period_start) = self.period_start(user_id).await? else {
            return Ok(None);
        };

        let filter = ReferralFilter::default().with_created_after(period_start);
        let direct_count = self.referrals.direct_count(user_id, &filter).await?;
        let indirect_count = self
            .referrals
            .indirect_count(user_id, &filter, MAX_REFERRAL_DEPTH)
            .await?;
        let sales = self.period_sales(user_id, period_start).await?;
        let rank = self.match_rank(direct_count, sales).await?;

        Ok(Some(RankInfo {
            period_start,
            direct_count,
            indirect_count,
            sales,
            rank,
        }))
    }

    /// Consume the current period by writing a reward record
    ///
    /// The reward amount interpolates linearly within the matched rank's
    /// reward band; with no rank matched the record still exists (zero
    /// amount, no rank) so the period advances. A positive amount is
    /// credited to the user's reward balance immediately at creation,
    /// before any administrative approval; approval is a pure status
    /// transition. This mirrors the platform's observed behavior and is
    /// intentionally different from how deposits and withdrawals are
    /// gated.
    pub async fn create_reward(
        &self,
        user_id: &UserId,
        info: &RankInfo,
        is_claimed: bool,
        now: DateTime<Utc>,
    ) -> CoreResult<Reward> {
        let amount = info
            .rank
            .as_ref()
            .map(|rank| rank.interpolate_reward(info.sales))
            .unwrap_or(Decimal::ZERO);

        let reward = Reward {
            reward_id: RewardId::generate(),
            user_id: user_id.clone(),
            rank_id: info.rank.as_ref().map(|rank| rank.rank_id.clone()),
            amount,
            sales: info.sales,
            direct_count: info.direct_count,
            indirect_count: info.indirect_count,
            is_claimed,
            status: ApprovalStatus::Pending,
            reason: None,
            created_at: now,
            updated_at: now,
        };
        let reward = self.rewards.create(reward).await?;

        if amount > Decimal::ZERO {
            self.users
                .adjust_balance(user_id, BalanceBucket::Reward, amount)
                .await?;
            let title = info
                .rank
                .as_ref()
                .map(|rank| rank.title.as_str())
                .unwrap_or("rank");
            self.notifier
                .notify(
                    user_id,
                    NotificationKind::RankReward,
                    &format!("You earned a {title} reward of {amount}"),
                )
                .await;
        }

        info!(
            user_id = %user_id,
            reward_id = %reward.reward_id,
            amount = %amount,
            is_claimed,
            "rank period consumed"
        );
        Ok(reward)
    }

    /// Claim the current period's reward
    pub async fn claim(&self, user_id: &UserId, now: DateTime<Utc>) -> CoreResult<Reward> {
        let info = self
            .rank_info(user_id)
            .await?
            .ok_or_else(|| CoreError::RankPeriodNotStarted {
                user_id: user_id.as_str().to_string(),
            })?;
        if info.rank.is_none() {
            return Err(CoreError::RankNotReached {
                user_id: user_id.as_str().to_string(),
            });
        }
        self.create_reward(user_id, &info, true, now).await
    }

    /// Automatic evaluation: consume the period when it has elapsed
    ///
    /// Returns the created reward, or `None` when no period is active or
    /// the period has not elapsed yet.
    pub async fn evaluate(&self, user_id: &UserId, now: DateTime<Utc>) -> CoreResult<Option<Reward>> {
        let Some(info) = self.rank_info(user_id).await? else {
            return Ok(None);
        };
        if !Self::period_elapsed(info.period_start, now) {
            return Ok(None);
        }
        let reward = self.create_reward(user_id, &info, false, now).await?;
        Ok(Some(reward))
    }

    /// Derive the period start: most recent unclaimed reward, else the
    /// earliest approved deposit among all descendants
    async fn period_start(&self, user_id: &UserId) -> CoreResult<Option<DateTime<Utc>>> {
        if let Some(reward) = self.rewards.latest_unclaimed(user_id).await? {
            return Ok(Some(reward.created_at));
        }

        let descendants = self.referrals.all_referrals(user_id, MAX_REFERRAL_DEPTH).await?;
        let mut earliest: Option<DateTime<Utc>> = None;
        for descendant in descendants {
            if let Some(at) = self
                .transactions
                .first_approved_deposit_at(&descendant.user_id)
                .await?
            {
                earliest = Some(match earliest {
                    Some(current) if current <= at => current,
                    _ => at,
                });
            }
        }
        Ok(earliest)
    }

    /// Sales volume for the period: each descendant's deposit-balance
    /// contribution since the period start, accumulated
    async fn period_sales(
        &self,
        user_id: &UserId,
        period_start: DateTime<Utc>,
    ) -> CoreResult<Decimal> {
        let descendants = self.referrals.all_referrals(user_id, MAX_REFERRAL_DEPTH).await?;
        let range = DateRange::since(period_start);
        let mut sales = Decimal::ZERO;
        for descendant in descendants {
            sales += self
                .balances
                .deposit_balance(&descendant.user_id, range)
                .await?;
        }
        Ok(sales)
    }

    /// Highest rank whose direct-referral requirement is met and whose
    /// sales band has been entered. Sales above the top band still match
    /// the top rank; the interpolation clamps the payout to its
    /// `reward_to`.
    async fn match_rank(&self, direct_count: u64, sales: Decimal) -> CoreResult<Option<Rank>> {
        let ranks = self.ranks.all().await?;
        Ok(ranks
            .into_iter()
            .rev()
            .find(|rank| {
                u64::from(rank.direct_referrals_required) <= direct_count
                    && rank.required_sales_from <= sales
            }))
    }
}
