//! Store Interfaces
//!
//! The engines consume the persistence layer through these traits. The
//! backing store is a generic document store offering indexed lookup
//! (`children_of` is an index on the referral edge, not a scan), filtered
//! summation, and atomic single-field increments. Missing documents
//! resolve to `None` or zero rather than an error.

use crate::error::CoreResult;
use crate::types::{
    ApprovalStatus, BalanceBucket, InvestmentLevel, Page, Program, Rank, RankId, Reward, RewardId,
    TierRef, Transaction, TransactionId, TransactionType, User, UserId, WithdrawalBucket,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Filter bounds for ledger summation
#[derive(Clone, Copy, Debug, Default)]
pub struct DateRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Unbounded range
    pub fn all() -> Self {
        Self::default()
    }

    /// Range starting at `since`
    pub fn since(since: DateTime<Utc>) -> Self {
        Self {
            since: Some(since),
            until: None,
        }
    }

    /// Whether a timestamp falls inside the range
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        if let Some(since) = self.since {
            if at < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if at > until {
                return false;
            }
        }
        true
    }
}

/// User store: identity, referral edges, cached balances
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Get a user by id
    async fn get(&self, user_id: &UserId) -> CoreResult<Option<User>>;

    /// Insert a new user
    async fn insert(&self, user: User) -> CoreResult<()>;

    /// Immediate children along the referral edge (indexed lookup)
    async fn children_of(&self, user_id: &UserId) -> CoreResult<Vec<UserId>>;

    /// Parent along the referral edge
    async fn parent_of(&self, user_id: &UserId) -> CoreResult<Option<UserId>>;

    /// Write the referral edge. Cycle checking happens in the graph
    /// layer before this is called.
    async fn set_referrer(&self, user_id: &UserId, referrer_id: &UserId) -> CoreResult<()>;

    /// Set or clear the user's program tier
    async fn set_tier(&self, user_id: &UserId, tier: Option<TierRef>) -> CoreResult<()>;

    /// Atomically add `delta` (possibly negative) to one cached balance
    /// field
    async fn adjust_balance(
        &self,
        user_id: &UserId,
        bucket: BalanceBucket,
        delta: Decimal,
    ) -> CoreResult<()>;

    /// Atomically overwrite one cached balance field (reconciliation)
    async fn set_balance(
        &self,
        user_id: &UserId,
        bucket: BalanceBucket,
        value: Decimal,
    ) -> CoreResult<()>;

    /// Page of active users with a tier and a positive deposit balance,
    /// ordered by user id
    async fn active_invested(&self, page: Page) -> CoreResult<Vec<User>>;

    /// Page over all users, ordered by user id
    async fn list(&self, page: Page) -> CoreResult<Vec<User>>;
}

/// Append-only transaction store
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Append a transaction
    async fn append(&self, transaction: Transaction) -> CoreResult<Transaction>;

    /// Get a transaction by id
    async fn get(&self, transaction_id: &TransactionId) -> CoreResult<Option<Transaction>>;

    /// Transition a pending transaction to a terminal status. The check
    /// and write happen under one lock so racing admins cannot both
    /// succeed; a terminal record yields `StaleTransition`.
    async fn transition_status(
        &self,
        transaction_id: &TransactionId,
        to: ApprovalStatus,
        now: DateTime<Utc>,
    ) -> CoreResult<Transaction>;

    /// Sum of `amount` over the user's transactions of one type within
    /// the given statuses and date range
    async fn sum_amount(
        &self,
        user_id: &UserId,
        transaction_type: TransactionType,
        statuses: &[ApprovalStatus],
        range: DateRange,
    ) -> CoreResult<Decimal>;

    /// Sum of `original_amount` over the user's withdrawals from one
    /// bucket within the given statuses and date range
    async fn sum_withdrawal_original(
        &self,
        user_id: &UserId,
        bucket: WithdrawalBucket,
        statuses: &[ApprovalStatus],
        range: DateRange,
    ) -> CoreResult<Decimal>;

    /// Timestamp of the user's earliest approved deposit
    async fn first_approved_deposit_at(
        &self,
        user_id: &UserId,
    ) -> CoreResult<Option<DateTime<Utc>>>;

    /// Whether an approved profit row already exists for the period
    async fn profit_exists(&self, user_id: &UserId, period_key: &str) -> CoreResult<bool>;

    /// Page of the user's transactions, newest first
    async fn list_for_user(&self, user_id: &UserId, page: Page) -> CoreResult<Vec<Transaction>>;
}

/// Reward store
#[async_trait]
pub trait RewardStore: Send + Sync {
    /// Create a reward record
    async fn create(&self, reward: Reward) -> CoreResult<Reward>;

    /// Get a reward by id
    async fn get(&self, reward_id: &RewardId) -> CoreResult<Option<Reward>>;

    /// Most recent unclaimed reward for a user
    async fn latest_unclaimed(&self, user_id: &UserId) -> CoreResult<Option<Reward>>;

    /// Transition a pending reward to a terminal status; rejection
    /// requires a reason
    async fn transition_status(
        &self,
        reward_id: &RewardId,
        to: ApprovalStatus,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<Reward>;

    /// Mark a reward as claimed
    async fn mark_claimed(&self, reward_id: &RewardId, now: DateTime<Utc>) -> CoreResult<Reward>;

    /// Sum of reward amounts for a user within the given statuses
    async fn sum_amount(
        &self,
        user_id: &UserId,
        statuses: &[ApprovalStatus],
    ) -> CoreResult<Decimal>;

    /// Page of the user's rewards, newest first
    async fn list_for_user(&self, user_id: &UserId, page: Page) -> CoreResult<Vec<Reward>>;
}

/// Program catalog store
#[async_trait]
pub trait ProgramStore: Send + Sync {
    /// Get the program for a level
    async fn get(&self, level: InvestmentLevel) -> CoreResult<Option<Program>>;

    /// Insert or replace a program
    async fn put(&self, program: Program) -> CoreResult<()>;
}

/// Rank catalog store
#[async_trait]
pub trait RankStore: Send + Sync {
    /// All ranks, ordered by `required_sales_from` ascending
    async fn all(&self) -> CoreResult<Vec<Rank>>;

    /// Get a rank by id
    async fn get(&self, rank_id: &RankId) -> CoreResult<Option<Rank>>;

    /// Insert or replace a rank
    async fn put(&self, rank: Rank) -> CoreResult<()>;
}
