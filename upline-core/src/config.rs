//! Profit Schedule Configuration
//!
//! The daily distribution consumes an explicit, versioned schedule value
//! handed to the run, never an ad-hoc query mid-loop. A new schedule
//! version supersedes the previous one from its `valid_from` date.

use crate::error::{CoreError, CoreResult};
use crate::types::InvestmentLevel;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Versioned profit-percentage schedule, one rate per investment level
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfitSchedule {
    pub version: String,
    pub valid_from: DateTime<Utc>,
    /// Daily profit percentage by level (e.g. 1.5 means 1.5%)
    pub rates: HashMap<InvestmentLevel, Decimal>,
}

impl ProfitSchedule {
    pub fn new(
        version: impl Into<String>,
        valid_from: DateTime<Utc>,
        rates: HashMap<InvestmentLevel, Decimal>,
    ) -> Self {
        Self {
            version: version.into(),
            valid_from,
            rates,
        }
    }

    /// Validate that every level has a non-negative rate
    pub fn validate(&self) -> CoreResult<()> {
        for level in InvestmentLevel::all() {
            match self.rates.get(&level) {
                None => {
                    return Err(CoreError::InvalidSchedule {
                        reason: format!("missing rate for level {level}"),
                    })
                }
                Some(rate) if *rate < Decimal::ZERO => {
                    return Err(CoreError::InvalidSchedule {
                        reason: format!("negative rate for level {level}"),
                    })
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Rate for a level
    pub fn rate(&self, level: InvestmentLevel) -> CoreResult<Decimal> {
        self.rates
            .get(&level)
            .copied()
            .ok_or_else(|| CoreError::ScheduleRateMissing {
                version: self.version.clone(),
                level: level.name().to_string(),
            })
    }
}

/// Settlement period key for a timestamp (one period per UTC day)
pub fn period_key_for(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> ProfitSchedule {
        let mut rates = HashMap::new();
        for (level, rate) in InvestmentLevel::all().into_iter().zip([10i64, 12, 14, 16, 18]) {
            rates.insert(level, Decimal::new(rate, 1));
        }
        ProfitSchedule::new("v1", Utc::now(), rates)
    }

    #[test]
    fn test_schedule_validates() {
        assert!(schedule().validate().is_ok());
    }

    #[test]
    fn test_schedule_missing_level_rejected() {
        let mut s = schedule();
        s.rates.remove(&InvestmentLevel::C);
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_schedule_negative_rate_rejected() {
        let mut s = schedule();
        s.rates.insert(InvestmentLevel::A, Decimal::new(-1, 0));
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_rate_lookup() {
        let s = schedule();
        assert_eq!(s.rate(InvestmentLevel::B).unwrap(), Decimal::new(12, 1));

        let mut missing = s.clone();
        missing.rates.remove(&InvestmentLevel::B);
        assert!(matches!(
            missing.rate(InvestmentLevel::B),
            Err(CoreError::ScheduleRateMissing { .. })
        ));
    }

    #[test]
    fn test_period_key_format() {
        let at = DateTime::parse_from_rfc3339("2024-03-05T14:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(period_key_for(at), "2024-03-05");
    }
}
