//! Balance Aggregation
//!
//! Every balance is derived from transaction history by filtered
//! summation; the cached fields on the user record are a read
//! optimization, never the source of truth. An unknown user has no
//! money: every aggregate resolves to zero instead of an error.
//!
//! Withdrawals subtract their `original_amount` while still Pending
//! because the cached bucket was already decremented synchronously at
//! withdrawal creation; summing only approved withdrawals here would
//! double-count the pending hold.

use crate::constants::MAX_REFERRAL_DEPTH;
use crate::error::CoreResult;
use crate::graph::ReferralGraph;
use crate::store::{DateRange, ProgramStore, RewardStore, TransactionStore, UserStore};
use crate::types::{ApprovalStatus, TransactionType, UserId, WithdrawalBucket};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// All six derived balances for a user
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Balances {
    pub deposit: Decimal,
    pub profit: Decimal,
    pub credit: Decimal,
    /// credit + deposit
    pub equity: Decimal,
    /// profit + deposit
    pub account: Decimal,
    pub reward: Decimal,
}

impl Balances {
    /// All-zero balances (unknown user)
    pub fn zero() -> Self {
        Self {
            deposit: Decimal::ZERO,
            profit: Decimal::ZERO,
            credit: Decimal::ZERO,
            equity: Decimal::ZERO,
            account: Decimal::ZERO,
            reward: Decimal::ZERO,
        }
    }
}

/// Derives balances from the ledger and the referral graph
pub struct BalanceAggregator {
    users: Arc<dyn UserStore>,
    transactions: Arc<dyn TransactionStore>,
    rewards: Arc<dyn RewardStore>,
    programs: Arc<dyn ProgramStore>,
    graph: ReferralGraph,
}

impl BalanceAggregator {
    pub fn new(
        users: Arc<dyn UserStore>,
        transactions: Arc<dyn TransactionStore>,
        rewards: Arc<dyn RewardStore>,
        programs: Arc<dyn ProgramStore>,
    ) -> Self {
        let graph = ReferralGraph::new(users.clone());
        Self {
            users,
            transactions,
            rewards,
            programs,
            graph,
        }
    }

    /// Deposit balance: approved deposits minus pending and approved
    /// withdrawal holds against the deposit bucket
    pub async fn deposit_balance(&self, user_id: &UserId, range: DateRange) -> CoreResult<Decimal> {
        let deposits = self
            .transactions
            .sum_amount(
                user_id,
                TransactionType::Deposit,
                &[ApprovalStatus::Approved],
                range,
            )
            .await?;
        let withdrawals = self
            .transactions
            .sum_withdrawal_original(
                user_id,
                WithdrawalBucket::Deposit,
                &[ApprovalStatus::Approved, ApprovalStatus::Pending],
                range,
            )
            .await?;
        Ok(deposits - withdrawals)
    }

    /// Profit balance: approved profit rows minus withdrawal holds
    /// against the profit bucket
    pub async fn profit_balance(&self, user_id: &UserId, range: DateRange) -> CoreResult<Decimal> {
        let profit = self
            .transactions
            .sum_amount(
                user_id,
                TransactionType::Profit,
                &[ApprovalStatus::Approved],
                range,
            )
            .await?;
        let withdrawals = self
            .transactions
            .sum_withdrawal_original(
                user_id,
                WithdrawalBucket::Profit,
                &[ApprovalStatus::Approved, ApprovalStatus::Pending],
                range,
            )
            .await?;
        Ok(profit - withdrawals)
    }

    /// Referral-credit balance, recomputed live from the downline
    ///
    /// Unlike the ledger-derived balances this is graph-derived: for
    /// every descendant within the depth cap, the descendant's approved
    /// deposits are weighted by the credit percentage of the sponsor's
    /// program tier at the descendant's depth. Descendants at depths the
    /// program has no tier for contribute nothing, as does the whole
    /// downline when the sponsor has no tier yet.
    pub async fn credit_balance(&self, user_id: &UserId, range: DateRange) -> CoreResult<Decimal> {
        let Some(user) = self.users.get(user_id).await? else {
            return Ok(Decimal::ZERO);
        };
        let Some(tier) = user.tier else {
            return Ok(Decimal::ZERO);
        };
        let Some(program) = self.programs.get(tier.level).await? else {
            return Ok(Decimal::ZERO);
        };

        let descendants = self.graph.descendants(user_id, MAX_REFERRAL_DEPTH).await?;
        let mut credit = Decimal::ZERO;
        for descendant in descendants {
            let Some(tier_row) = program.tier_at_sub_level(descendant.depth) else {
                continue;
            };
            let deposits = self
                .transactions
                .sum_amount(
                    &descendant.user_id,
                    TransactionType::Deposit,
                    &[ApprovalStatus::Approved],
                    range,
                )
                .await?;
            credit += deposits * tier_row.credit_percentage / Decimal::ONE_HUNDRED;
        }
        Ok(credit)
    }

    /// Reward balance: pending and approved reward records minus
    /// withdrawal holds against the reward bucket
    pub async fn reward_balance(&self, user_id: &UserId) -> CoreResult<Decimal> {
        let rewards = self
            .rewards
            .sum_amount(
                user_id,
                &[ApprovalStatus::Approved, ApprovalStatus::Pending],
            )
            .await?;
        let withdrawals = self
            .transactions
            .sum_withdrawal_original(
                user_id,
                WithdrawalBucket::Reward,
                &[ApprovalStatus::Approved, ApprovalStatus::Pending],
                DateRange::all(),
            )
            .await?;
        Ok(rewards - withdrawals)
    }

    /// Equity balance: credit + deposit
    pub async fn equity_balance(&self, user_id: &UserId, range: DateRange) -> CoreResult<Decimal> {
        Ok(self.credit_balance(user_id, range).await? + self.deposit_balance(user_id, range).await?)
    }

    /// Account balance: profit + deposit
    pub async fn account_balance(&self, user_id: &UserId, range: DateRange) -> CoreResult<Decimal> {
        Ok(self.profit_balance(user_id, range).await? + self.deposit_balance(user_id, range).await?)
    }

    /// All six balances at once
    pub async fn balances(&self, user_id: &UserId) -> CoreResult<Balances> {
        let range = DateRange::all();
        let deposit = self.deposit_balance(user_id, range).await?;
        let profit = self.profit_balance(user_id, range).await?;
        let credit = self.credit_balance(user_id, range).await?;
        let reward = self.reward_balance(user_id).await?;
        Ok(Balances {
            deposit,
            profit,
            credit,
            equity: credit + deposit,
            account: profit + deposit,
            reward,
        })
    }
}
