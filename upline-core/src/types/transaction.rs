//! Ledger Transactions
//!
//! Transactions are the source of truth for every balance. Records are
//! append-only: after creation the only mutable field is the approval
//! status, which transitions exactly once out of Pending.

use crate::error::{CoreError, CoreResult};
use crate::types::common::{ApprovalStatus, TransactionId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transaction type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Profit,
    Reward,
    ReferralCredit,
}

impl TransactionType {
    /// Get type name for logging and error messages
    pub fn name(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Profit => "profit",
            TransactionType::Reward => "reward",
            TransactionType::ReferralCredit => "referral_credit",
        }
    }

    /// Whether the platform fee applies to this type
    pub fn fee_applies(&self) -> bool {
        matches!(self, TransactionType::Deposit | TransactionType::Withdrawal)
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The balance bucket a withdrawal draws from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalBucket {
    Deposit,
    Profit,
    Reward,
}

impl WithdrawalBucket {
    /// Get bucket name
    pub fn name(&self) -> &'static str {
        match self {
            WithdrawalBucket::Deposit => "deposit",
            WithdrawalBucket::Profit => "profit",
            WithdrawalBucket::Reward => "reward",
        }
    }

    /// The cached balance field this bucket maps to
    pub fn balance_bucket(&self) -> BalanceBucket {
        match self {
            WithdrawalBucket::Deposit => BalanceBucket::Deposit,
            WithdrawalBucket::Profit => BalanceBucket::Profit,
            WithdrawalBucket::Reward => BalanceBucket::Reward,
        }
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "deposit" => Some(WithdrawalBucket::Deposit),
            "profit" => Some(WithdrawalBucket::Profit),
            "reward" => Some(WithdrawalBucket::Reward),
            _ => None,
        }
    }
}

impl std::fmt::Display for WithdrawalBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The four cached balance fields on a user record
///
/// Every cache mutation names its bucket explicitly so stores can apply
/// it as an atomic single-field increment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceBucket {
    Deposit,
    Profit,
    ReferralCredit,
    Reward,
}

impl BalanceBucket {
    /// Get bucket name
    pub fn name(&self) -> &'static str {
        match self {
            BalanceBucket::Deposit => "deposit",
            BalanceBucket::Profit => "profit",
            BalanceBucket::ReferralCredit => "referral_credit",
            BalanceBucket::Reward => "reward",
        }
    }
}

impl std::fmt::Display for BalanceBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Ledger transaction
///
/// For fee-bearing types the split is fixed at creation time and never
/// recomputed: `amount = original_amount - fees_amount`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub user_id: UserId,
    pub transaction_type: TransactionType,
    pub status: ApprovalStatus,
    /// Net amount, post-fee
    pub amount: Decimal,
    /// Pre-fee amount
    pub original_amount: Decimal,
    pub fees_amount: Decimal,
    /// Bucket a withdrawal draws from (withdrawals only)
    pub withdrawal_bucket: Option<WithdrawalBucket>,
    /// Percentage used to compute a profit row (profit only)
    pub profit_percentage: Option<Decimal>,
    /// Settlement period key for profit rows; at most one approved
    /// profit row exists per (user, period)
    pub period_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a pending deposit with the fee split fixed at creation
    pub fn deposit(
        user_id: UserId,
        original_amount: Decimal,
        fee_rate: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        let fees_amount = original_amount * fee_rate;
        Self {
            transaction_id: TransactionId::generate(),
            user_id,
            transaction_type: TransactionType::Deposit,
            status: ApprovalStatus::Pending,
            amount: original_amount - fees_amount,
            original_amount,
            fees_amount,
            withdrawal_bucket: None,
            profit_percentage: None,
            period_key: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a pending withdrawal against a balance bucket
    pub fn withdrawal(
        user_id: UserId,
        original_amount: Decimal,
        fee_rate: Decimal,
        bucket: WithdrawalBucket,
        now: DateTime<Utc>,
    ) -> Self {
        let fees_amount = original_amount * fee_rate;
        Self {
            transaction_id: TransactionId::generate(),
            user_id,
            transaction_type: TransactionType::Withdrawal,
            status: ApprovalStatus::Pending,
            amount: original_amount - fees_amount,
            original_amount,
            fees_amount,
            withdrawal_bucket: Some(bucket),
            profit_percentage: None,
            period_key: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an approved, fee-exempt profit row for a settlement period
    pub fn profit(
        user_id: UserId,
        equity: Decimal,
        percentage: Decimal,
        applied: Decimal,
        period_key: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id: TransactionId::generate(),
            user_id,
            transaction_type: TransactionType::Profit,
            status: ApprovalStatus::Approved,
            amount: applied,
            original_amount: equity,
            fees_amount: Decimal::ZERO,
            withdrawal_bucket: None,
            profit_percentage: Some(percentage),
            period_key: Some(period_key.into()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an approved, fee-exempt referral-credit row
    pub fn referral_credit(user_id: UserId, amount: Decimal, now: DateTime<Utc>) -> Self {
        Self {
            transaction_id: TransactionId::generate(),
            user_id,
            transaction_type: TransactionType::ReferralCredit,
            status: ApprovalStatus::Approved,
            amount,
            original_amount: amount,
            fees_amount: Decimal::ZERO,
            withdrawal_bucket: None,
            profit_percentage: None,
            period_key: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Verify the fee split invariant
    pub fn fee_invariant_holds(&self) -> bool {
        self.amount + self.fees_amount == self.original_amount
    }

    /// Transition out of Pending
    ///
    /// The transition is terminal: a second transition (or a transition
    /// back to Pending) fails with `StaleTransition`.
    pub fn transition(&mut self, to: ApprovalStatus, now: DateTime<Utc>) -> CoreResult<()> {
        if !to.is_terminal() {
            return Err(CoreError::validation(
                "a transaction cannot transition back to pending",
            ));
        }
        if self.status.is_terminal() {
            return Err(CoreError::stale(
                "Transaction",
                self.transaction_id.as_str(),
                self.status.name(),
            ));
        }
        self.status = to;
        self.updated_at = now;
        Ok(())
    }
}
