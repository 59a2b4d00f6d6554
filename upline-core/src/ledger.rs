//! Transaction Lifecycle
//!
//! Creation and administrative transitions for deposits, withdrawals and
//! rewards. Fees are fixed at creation and never recomputed. Withdrawals
//! decrement their bucket synchronously at creation, so approval is a
//! pure status transition and rejection refunds the hold.

use crate::balance::BalanceAggregator;
use crate::constants::default_fee_rate;
use crate::distribution::CreditPropagator;
use crate::error::{CoreError, CoreResult};
use crate::notify::{NotificationKind, NotificationSink};
use crate::store::{DateRange, ProgramStore, RewardStore, TransactionStore, UserStore};
use crate::types::{
    ApprovalStatus, BalanceBucket, InvestmentLevel, Reward, RewardId, TierRef, Transaction,
    TransactionId, TransactionType, UserId, WithdrawalBucket,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

/// Ledger service configuration
#[derive(Clone, Copy, Debug)]
pub struct LedgerConfig {
    /// Fee rate applied to deposits and withdrawals
    pub fee_rate: Decimal,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            fee_rate: default_fee_rate(),
        }
    }
}

/// Transaction lifecycle service
pub struct LedgerService {
    config: LedgerConfig,
    users: Arc<dyn UserStore>,
    transactions: Arc<dyn TransactionStore>,
    rewards: Arc<dyn RewardStore>,
    programs: Arc<dyn ProgramStore>,
    balances: Arc<BalanceAggregator>,
    propagator: CreditPropagator,
    notifier: Arc<dyn NotificationSink>,
}

impl LedgerService {
    pub fn new(
        config: LedgerConfig,
        users: Arc<dyn UserStore>,
        transactions: Arc<dyn TransactionStore>,
        rewards: Arc<dyn RewardStore>,
        programs: Arc<dyn ProgramStore>,
        balances: Arc<BalanceAggregator>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let propagator = CreditPropagator::new(
            users.clone(),
            transactions.clone(),
            programs.clone(),
            notifier.clone(),
        );
        Self {
            config,
            users,
            transactions,
            rewards,
            programs,
            balances,
            propagator,
            notifier,
        }
    }

    /// Create a pending deposit
    pub async fn create_deposit(
        &self,
        user_id: &UserId,
        original_amount: Decimal,
        now: DateTime<Utc>,
    ) -> CoreResult<Transaction> {
        if original_amount <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount {
                reason: "deposit amount must be positive".to_string(),
            });
        }
        if self.users.get(user_id).await?.is_none() {
            return Err(CoreError::not_found("User", user_id.as_str()));
        }

        let transaction =
            Transaction::deposit(user_id.clone(), original_amount, self.config.fee_rate, now);
        self.transactions.append(transaction.clone()).await?;
        Ok(transaction)
    }

    /// Create a pending withdrawal against one balance bucket
    ///
    /// The bucket's available balance is checked against the ledger (not
    /// the cache) and the cached field is decremented synchronously, so
    /// the hold is visible to every reader immediately.
    pub async fn create_withdrawal(
        &self,
        user_id: &UserId,
        original_amount: Decimal,
        bucket: WithdrawalBucket,
        now: DateTime<Utc>,
    ) -> CoreResult<Transaction> {
        if original_amount <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount {
                reason: "withdrawal amount must be positive".to_string(),
            });
        }
        if self.users.get(user_id).await?.is_none() {
            return Err(CoreError::not_found("User", user_id.as_str()));
        }

        let available = match bucket {
            WithdrawalBucket::Deposit => {
                self.balances.deposit_balance(user_id, DateRange::all()).await?
            }
            WithdrawalBucket::Profit => {
                self.balances.profit_balance(user_id, DateRange::all()).await?
            }
            WithdrawalBucket::Reward => self.balances.reward_balance(user_id).await?,
        };
        if original_amount > available {
            return Err(CoreError::InsufficientBalance {
                bucket: bucket.name().to_string(),
                requested: original_amount,
                available,
            });
        }

        let transaction = Transaction::withdrawal(
            user_id.clone(),
            original_amount,
            self.config.fee_rate,
            bucket,
            now,
        );
        self.transactions.append(transaction.clone()).await?;
        self.users
            .adjust_balance(user_id, bucket.balance_bucket(), -original_amount)
            .await?;
        Ok(transaction)
    }

    /// Approve a pending transaction
    ///
    /// Deposit approval is the moment money enters the system: the
    /// deposit cache is incremented, the depositor's tier is recomputed
    /// from equity, and credit fans out to the ancestor chain.
    /// Withdrawal approval changes nothing beyond the status.
    pub async fn approve(
        &self,
        transaction_id: &TransactionId,
        now: DateTime<Utc>,
    ) -> CoreResult<Transaction> {
        let transaction = self
            .transactions
            .transition_status(transaction_id, ApprovalStatus::Approved, now)
            .await?;

        if transaction.transaction_type == TransactionType::Deposit {
            self.users
                .adjust_balance(
                    &transaction.user_id,
                    BalanceBucket::Deposit,
                    transaction.amount,
                )
                .await?;
            self.retier(&transaction.user_id).await?;
            self.propagator
                .propagate(&transaction.user_id, transaction.amount, now)
                .await?;
            self.notifier
                .notify(
                    &transaction.user_id,
                    NotificationKind::DepositApproved,
                    &format!("Deposit of {} approved", transaction.amount),
                )
                .await;
        }

        info!(
            transaction_id = %transaction.transaction_id,
            user_id = %transaction.user_id,
            transaction_type = %transaction.transaction_type,
            "transaction approved"
        );
        Ok(transaction)
    }

    /// Reject a pending transaction
    ///
    /// A rejected withdrawal refunds its hold back into the originating
    /// bucket; a rejected deposit never touched any balance.
    pub async fn reject(
        &self,
        transaction_id: &TransactionId,
        now: DateTime<Utc>,
    ) -> CoreResult<Transaction> {
        let transaction = self
            .transactions
            .transition_status(transaction_id, ApprovalStatus::Rejected, now)
            .await?;

        if transaction.transaction_type == TransactionType::Withdrawal {
            let bucket = transaction.withdrawal_bucket.ok_or_else(|| {
                CoreError::MissingWithdrawalBucket {
                    id: transaction.transaction_id.as_str().to_string(),
                }
            })?;
            self.users
                .adjust_balance(
                    &transaction.user_id,
                    bucket.balance_bucket(),
                    transaction.original_amount,
                )
                .await?;
            self.notifier
                .notify(
                    &transaction.user_id,
                    NotificationKind::WithdrawalRejected,
                    &format!(
                        "Withdrawal of {} rejected, funds returned",
                        transaction.original_amount
                    ),
                )
                .await;
        }

        info!(
            transaction_id = %transaction.transaction_id,
            user_id = %transaction.user_id,
            transaction_type = %transaction.transaction_type,
            "transaction rejected"
        );
        Ok(transaction)
    }

    /// Approve a pending reward. The amount was already credited when
    /// the reward was created, so this is a pure status transition.
    pub async fn approve_reward(
        &self,
        reward_id: &RewardId,
        now: DateTime<Utc>,
    ) -> CoreResult<Reward> {
        self.rewards
            .transition_status(reward_id, ApprovalStatus::Approved, None, now)
            .await
    }

    /// Reject a pending reward, debiting the creation-time credit so the
    /// cache keeps matching the {pending, approved} aggregation
    pub async fn reject_reward(
        &self,
        reward_id: &RewardId,
        reason: String,
        now: DateTime<Utc>,
    ) -> CoreResult<Reward> {
        let reward = self
            .rewards
            .transition_status(reward_id, ApprovalStatus::Rejected, Some(reason), now)
            .await?;
        if reward.amount > Decimal::ZERO {
            self.users
                .adjust_balance(&reward.user_id, BalanceBucket::Reward, -reward.amount)
                .await?;
        }
        Ok(reward)
    }

    /// Recompute the user's tier from ledger-derived equity
    ///
    /// The highest tier across all programs whose investment threshold
    /// is reached wins; a user never moves to a tier by any other path.
    async fn retier(&self, user_id: &UserId) -> CoreResult<()> {
        let equity = self.balances.equity_balance(user_id, DateRange::all()).await?;

        let mut best: Option<(TierRef, Decimal)> = None;
        for level in InvestmentLevel::all() {
            let Some(program) = self.programs.get(level).await? else {
                continue;
            };
            if let Some(tier) = program.tier_for_equity(equity) {
                let candidate = (TierRef::new(level, tier.sub_level), tier.investment);
                best = match best {
                    Some(current) if current.1 >= candidate.1 => Some(current),
                    _ => Some(candidate),
                };
            }
        }

        if let Some((tier, _)) = best {
            self.users.set_tier(user_id, Some(tier)).await?;
        }
        Ok(())
    }

    /// The propagator, for callers that need to fan credit out directly
    pub fn propagator(&self) -> &CreditPropagator {
        &self.propagator
    }
}
