//! In-memory reward store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use upline_core::error::{CoreError, CoreResult};
use upline_core::store::RewardStore;
use upline_core::types::{ApprovalStatus, Page, Reward, RewardId, UserId};

/// Reward store over a guarded map
#[derive(Default)]
pub struct MemoryRewardStore {
    rewards: RwLock<HashMap<RewardId, Reward>>,
}

impl MemoryRewardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RewardStore for MemoryRewardStore {
    async fn create(&self, reward: Reward) -> CoreResult<Reward> {
        let mut rewards = self.rewards.write().await;
        rewards.insert(reward.reward_id.clone(), reward.clone());
        Ok(reward)
    }

    async fn get(&self, reward_id: &RewardId) -> CoreResult<Option<Reward>> {
        let rewards = self.rewards.read().await;
        Ok(rewards.get(reward_id).cloned())
    }

    async fn latest_unclaimed(&self, user_id: &UserId) -> CoreResult<Option<Reward>> {
        let rewards = self.rewards.read().await;
        Ok(rewards
            .values()
            .filter(|reward| reward.user_id == *user_id && !reward.is_claimed)
            .max_by_key(|reward| reward.created_at)
            .cloned())
    }

    async fn transition_status(
        &self,
        reward_id: &RewardId,
        to: ApprovalStatus,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> CoreResult<Reward> {
        let mut rewards = self.rewards.write().await;
        let reward = rewards
            .get_mut(reward_id)
            .ok_or_else(|| CoreError::not_found("Reward", reward_id.as_str()))?;
        reward.transition(to, reason, now)?;
        Ok(reward.clone())
    }

    async fn mark_claimed(&self, reward_id: &RewardId, now: DateTime<Utc>) -> CoreResult<Reward> {
        let mut rewards = self.rewards.write().await;
        let reward = rewards
            .get_mut(reward_id)
            .ok_or_else(|| CoreError::not_found("Reward", reward_id.as_str()))?;
        reward.is_claimed = true;
        reward.updated_at = now;
        Ok(reward.clone())
    }

    async fn sum_amount(
        &self,
        user_id: &UserId,
        statuses: &[ApprovalStatus],
    ) -> CoreResult<Decimal> {
        let rewards = self.rewards.read().await;
        Ok(rewards
            .values()
            .filter(|reward| reward.user_id == *user_id && statuses.contains(&reward.status))
            .map(|reward| reward.amount)
            .sum())
    }

    async fn list_for_user(&self, user_id: &UserId, page: Page) -> CoreResult<Vec<Reward>> {
        let rewards = self.rewards.read().await;
        let mut rows: Vec<Reward> = rewards
            .values()
            .filter(|reward| reward.user_id == *user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .skip(page.offset())
            .take(page.page_size as usize)
            .collect())
    }
}
