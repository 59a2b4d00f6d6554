//! In-memory program and rank catalogs

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use upline_core::error::CoreResult;
use upline_core::store::{ProgramStore, RankStore};
use upline_core::types::{InvestmentLevel, Program, Rank, RankId};

/// Program catalog over a guarded map
#[derive(Default)]
pub struct MemoryProgramStore {
    programs: RwLock<HashMap<InvestmentLevel, Program>>,
}

impl MemoryProgramStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgramStore for MemoryProgramStore {
    async fn get(&self, level: InvestmentLevel) -> CoreResult<Option<Program>> {
        let programs = self.programs.read().await;
        Ok(programs.get(&level).cloned())
    }

    async fn put(&self, program: Program) -> CoreResult<()> {
        program.validate()?;
        let mut programs = self.programs.write().await;
        programs.insert(program.level, program);
        Ok(())
    }
}

/// Rank catalog kept sorted by sales-band floor
#[derive(Default)]
pub struct MemoryRankStore {
    ranks: RwLock<Vec<Rank>>,
}

impl MemoryRankStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RankStore for MemoryRankStore {
    async fn all(&self) -> CoreResult<Vec<Rank>> {
        let ranks = self.ranks.read().await;
        Ok(ranks.clone())
    }

    async fn get(&self, rank_id: &RankId) -> CoreResult<Option<Rank>> {
        let ranks = self.ranks.read().await;
        Ok(ranks.iter().find(|rank| rank.rank_id == *rank_id).cloned())
    }

    async fn put(&self, rank: Rank) -> CoreResult<()> {
        let mut ranks = self.ranks.write().await;
        ranks.retain(|existing| existing.rank_id != rank.rank_id);
        ranks.push(rank);
        ranks.sort_by(|a, b| a.required_sales_from.cmp(&b.required_sales_from));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use upline_core::types::ProgramTier;

    #[tokio::test]
    async fn test_program_put_validates() {
        let store = MemoryProgramStore::new();
        let bad = Program::new(
            InvestmentLevel::A,
            vec![
                ProgramTier {
                    sub_level: 2,
                    investment: Decimal::new(100, 0),
                    profit_percent_from: Decimal::ONE,
                    profit_percent_to: Decimal::TWO,
                    credit_percentage: Decimal::ONE,
                    direct_referrals_required: 0,
                },
                ProgramTier {
                    sub_level: 1,
                    investment: Decimal::new(500, 0),
                    profit_percent_from: Decimal::ONE,
                    profit_percent_to: Decimal::TWO,
                    credit_percentage: Decimal::ONE,
                    direct_referrals_required: 0,
                },
            ],
        );
        assert!(store.put(bad).await.is_err());
    }

    #[tokio::test]
    async fn test_ranks_sorted_by_sales_floor() {
        let store = MemoryRankStore::new();
        let rank = |id: &str, floor: i64| Rank {
            rank_id: RankId::new(id),
            title: id.to_string(),
            reward_from: Decimal::new(100, 0),
            reward_to: Decimal::new(200, 0),
            required_sales_from: Decimal::new(floor, 0),
            required_sales_to: Decimal::new(floor + 5_000, 0),
            direct_referrals_required: 0,
            weekly_meetings: 0,
        };
        store.put(rank("rank:high", 20_000)).await.unwrap();
        store.put(rank("rank:low", 5_000)).await.unwrap();

        let all = store.all().await.unwrap();
        assert_eq!(all[0].rank_id, RankId::new("rank:low"));
        assert_eq!(all[1].rank_id, RankId::new("rank:high"));
    }
}
