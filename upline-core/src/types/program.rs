//! Investment Programs
//!
//! One program per top-level investment level (A-E), each holding an
//! ordered array of tiers keyed by sub-level. A user's tier is always
//! derived from equity via `tier_for_equity`; it is never set to an
//! arbitrary value from the outside.

use crate::error::{CoreError, CoreResult};
use crate::types::common::InvestmentLevel;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One tier row within a program
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgramTier {
    pub sub_level: u8,
    /// Deposit-equity threshold to reach this tier
    pub investment: Decimal,
    pub profit_percent_from: Decimal,
    pub profit_percent_to: Decimal,
    /// Percentage of a downline deposit credited to the sponsor
    pub credit_percentage: Decimal,
    pub direct_referrals_required: u32,
}

/// Investment program for one level
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub level: InvestmentLevel,
    /// Tiers ordered by sub-level, monotonically increasing in `investment`
    pub tiers: Vec<ProgramTier>,
}

impl Program {
    pub fn new(level: InvestmentLevel, tiers: Vec<ProgramTier>) -> Self {
        Self { level, tiers }
    }

    /// Validate tier ordering: sub-levels strictly increasing and
    /// investment thresholds monotonically increasing
    pub fn validate(&self) -> CoreResult<()> {
        for pair in self.tiers.windows(2) {
            if pair[1].sub_level <= pair[0].sub_level {
                return Err(CoreError::validation(format!(
                    "program {}: sub-levels out of order ({} then {})",
                    self.level, pair[0].sub_level, pair[1].sub_level
                )));
            }
            if pair[1].investment < pair[0].investment {
                return Err(CoreError::validation(format!(
                    "program {}: investment thresholds not monotonic at sub-level {}",
                    self.level, pair[1].sub_level
                )));
            }
        }
        Ok(())
    }

    /// The highest tier whose investment threshold is <= equity
    pub fn tier_for_equity(&self, equity: Decimal) -> Option<&ProgramTier> {
        self.tiers
            .iter()
            .rev()
            .find(|tier| tier.investment <= equity)
    }

    /// Look up a tier by sub-level
    pub fn tier_at_sub_level(&self, sub_level: u8) -> Option<&ProgramTier> {
        self.tiers.iter().find(|tier| tier.sub_level == sub_level)
    }
}
