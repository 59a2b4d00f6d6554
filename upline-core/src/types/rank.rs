//! Ranks and Rewards
//!
//! Ranks are a static catalog, looked up and never mutated at runtime.
//! Rewards record one rank-period evaluation per user; like transactions
//! their status transitions exactly once out of Pending.

use crate::error::{CoreError, CoreResult};
use crate::types::common::{ApprovalStatus, RankId, RewardId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rank catalog entry
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rank {
    pub rank_id: RankId,
    pub title: String,
    /// Cash reward band
    pub reward_from: Decimal,
    pub reward_to: Decimal,
    /// Sales-volume band the rank covers
    pub required_sales_from: Decimal,
    pub required_sales_to: Decimal,
    pub direct_referrals_required: u32,
    pub weekly_meetings: u32,
}

impl Rank {
    /// Reward amount for a sales figure, linearly interpolated within
    /// the reward band in proportion to the position of `sales` inside
    /// the sales band. Sales at or above the band top pay `reward_to`;
    /// sales below the band floor pay zero.
    pub fn interpolate_reward(&self, sales: Decimal) -> Decimal {
        if self.required_sales_to <= sales {
            return self.reward_to;
        }
        if self.required_sales_from > sales {
            return Decimal::ZERO;
        }
        let band = self.required_sales_to - self.required_sales_from;
        if band.is_zero() {
            return self.reward_to;
        }
        self.reward_from
            + (self.reward_to - self.reward_from) * (sales - self.required_sales_from) / band
    }
}

/// One rank-period evaluation for a user
///
/// `rank_id` is None when the period ended without any rank reached; the
/// record still exists to mark the period as consumed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub reward_id: RewardId,
    pub user_id: UserId,
    pub rank_id: Option<RankId>,
    pub amount: Decimal,
    /// Sales volume measured over the period
    pub sales: Decimal,
    pub direct_count: u64,
    pub indirect_count: u64,
    pub is_claimed: bool,
    pub status: ApprovalStatus,
    /// Required when the reward is rejected
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reward {
    /// Transition out of Pending; rejection requires a reason
    pub fn transition(
        &mut self,
        to: ApprovalStatus,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        if !to.is_terminal() {
            return Err(CoreError::validation(
                "a reward cannot transition back to pending",
            ));
        }
        if self.status.is_terminal() {
            return Err(CoreError::stale(
                "Reward",
                self.reward_id.as_str(),
                self.status.name(),
            ));
        }
        if to == ApprovalStatus::Rejected && reason.as_deref().map_or(true, str::is_empty) {
            return Err(CoreError::validation("rejection requires a reason"));
        }
        self.status = to;
        self.reason = reason;
        self.updated_at = now;
        Ok(())
    }
}
