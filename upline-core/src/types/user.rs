//! User Records
//!
//! The four `*_balance` fields are a denormalized cache over the ledger:
//! they are written only via atomic single-field increments tied 1:1 to a
//! ledger write, and can always be rebuilt from transaction history.

use crate::types::common::{InvestmentLevel, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A user's current program tier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRef {
    pub level: InvestmentLevel,
    pub sub_level: u8,
}

impl TierRef {
    pub fn new(level: InvestmentLevel, sub_level: u8) -> Self {
        Self { level, sub_level }
    }
}

impl std::fmt::Display for TierRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.level, self.sub_level)
    }
}

/// User record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    /// Upward referral edge; None only for roots of the forest
    pub referral_id: Option<UserId>,
    /// Current program tier; None until the first deposit is approved
    pub tier: Option<TierRef>,
    pub is_active: bool,
    pub deposit_balance: Decimal,
    pub profit_balance: Decimal,
    pub referral_credit_balance: Decimal,
    pub reward_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create an active user with zeroed balances
    pub fn new(user_id: UserId, referral_id: Option<UserId>, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            referral_id,
            tier: None,
            is_active: true,
            deposit_balance: Decimal::ZERO,
            profit_balance: Decimal::ZERO,
            referral_credit_balance: Decimal::ZERO,
            reward_balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Cached equity: referral credit + deposit
    pub fn cached_equity(&self) -> Decimal {
        self.referral_credit_balance + self.deposit_balance
    }

    /// Whether the user participates in the daily distribution
    pub fn is_invested(&self) -> bool {
        self.is_active && self.tier.is_some() && self.deposit_balance > Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_is_root_without_referrer() {
        let user = User::new(UserId::new("user:1"), None, Utc::now());
        assert!(user.referral_id.is_none());
        assert!(user.is_active);
        assert_eq!(user.deposit_balance, Decimal::ZERO);
    }

    #[test]
    fn test_cached_equity() {
        let mut user = User::new(UserId::new("user:1"), None, Utc::now());
        user.deposit_balance = Decimal::new(100, 0);
        user.referral_credit_balance = Decimal::new(40, 0);
        assert_eq!(user.cached_equity(), Decimal::new(140, 0));
    }

    #[test]
    fn test_is_invested_requires_tier_and_deposit() {
        let mut user = User::new(UserId::new("user:1"), None, Utc::now());
        assert!(!user.is_invested());

        user.tier = Some(TierRef::new(InvestmentLevel::A, 1));
        assert!(!user.is_invested());

        user.deposit_balance = Decimal::new(50, 0);
        assert!(user.is_invested());

        user.is_active = false;
        assert!(!user.is_invested());
    }
}
