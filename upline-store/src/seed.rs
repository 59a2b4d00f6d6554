//! Catalog seeds and store bundling
//!
//! Default program and rank catalogs for tests, demos and local runs.
//! Real deployments load these from configuration.

use rust_decimal::Decimal;
use std::sync::Arc;
use upline_core::error::CoreResult;
use upline_core::store::{ProgramStore, RankStore, RewardStore, TransactionStore, UserStore};
use upline_core::types::{InvestmentLevel, Program, ProgramTier, Rank, RankId};

use crate::memory::{
    MemoryProgramStore, MemoryRankStore, MemoryRewardStore, MemoryTransactionStore,
    MemoryUserStore,
};

/// One handle per store trait, shared across the engines
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub transactions: Arc<dyn TransactionStore>,
    pub rewards: Arc<dyn RewardStore>,
    pub programs: Arc<dyn ProgramStore>,
    pub ranks: Arc<dyn RankStore>,
}

impl Stores {
    /// Fresh in-memory stores
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            transactions: Arc::new(MemoryTransactionStore::new()),
            rewards: Arc::new(MemoryRewardStore::new()),
            programs: Arc::new(MemoryProgramStore::new()),
            ranks: Arc::new(MemoryRankStore::new()),
        }
    }

    /// Fresh in-memory stores with the default catalogs loaded
    pub async fn in_memory_seeded() -> CoreResult<Self> {
        let stores = Self::in_memory();
        for program in default_programs() {
            stores.programs.put(program).await?;
        }
        for rank in default_ranks() {
            stores.ranks.put(rank).await?;
        }
        Ok(stores)
    }
}

/// Default five-level program catalog
///
/// Every level carries eight tiers (one per referral depth). Thresholds
/// and percentages scale with the level; credit percentages taper with
/// the sub-level so deeper downline activity earns less.
pub fn default_programs() -> Vec<Program> {
    InvestmentLevel::all()
        .into_iter()
        .enumerate()
        .map(|(index, level)| {
            let base = match level {
                InvestmentLevel::A => Decimal::new(100, 0),
                InvestmentLevel::B => Decimal::new(250, 0),
                InvestmentLevel::C => Decimal::new(500, 0),
                InvestmentLevel::D => Decimal::new(1_000, 0),
                InvestmentLevel::E => Decimal::new(2_500, 0),
            };
            let tiers = (1..=8u8)
                .map(|sub_level| ProgramTier {
                    sub_level,
                    investment: base * Decimal::from(sub_level),
                    profit_percent_from: Decimal::new(5, 1),
                    profit_percent_to: Decimal::new(15, 1) + Decimal::from(index as i64) * Decimal::new(5, 1),
                    credit_percentage: Decimal::from(9u8.saturating_sub(sub_level)),
                    direct_referrals_required: u32::from(sub_level.saturating_sub(1)),
                })
                .collect();
            Program::new(level, tiers)
        })
        .collect()
}

/// Default rank catalog, ordered by sales-band floor
pub fn default_ranks() -> Vec<Rank> {
    let rank = |id: &str, title: &str, reward: (i64, i64), sales: (i64, i64), directs: u32, meetings: u32| Rank {
        rank_id: RankId::new(id),
        title: title.to_string(),
        reward_from: Decimal::new(reward.0, 0),
        reward_to: Decimal::new(reward.1, 0),
        required_sales_from: Decimal::new(sales.0, 0),
        required_sales_to: Decimal::new(sales.1, 0),
        direct_referrals_required: directs,
        weekly_meetings: meetings,
    };
    vec![
        rank("rank:associate", "Associate", (50, 150), (2_000, 5_000), 2, 1),
        rank("rank:builder", "Builder", (300, 500), (10_000, 15_000), 3, 1),
        rank("rank:director", "Director", (800, 1_500), (25_000, 50_000), 5, 2),
        rank("rank:executive", "Executive", (2_500, 5_000), (75_000, 150_000), 8, 2),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_programs_validate() {
        for program in default_programs() {
            program.validate().unwrap();
            assert_eq!(program.tiers.len(), 8);
        }
    }

    #[test]
    fn test_default_ranks_ordered() {
        let ranks = default_ranks();
        for pair in ranks.windows(2) {
            assert!(pair[0].required_sales_from < pair[1].required_sales_from);
        }
    }

    #[tokio::test]
    async fn test_in_memory_seeded() {
        let stores = Stores::in_memory_seeded().await.unwrap();
        assert!(stores
            .programs
            .get(InvestmentLevel::C)
            .await
            .unwrap()
            .is_some());
        assert_eq!(stores.ranks.all().await.unwrap().len(), 4);
    }
}
