//! In-memory user store

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;
use upline_core::error::{CoreError, CoreResult};
use upline_core::store::UserStore;
use upline_core::types::{BalanceBucket, Page, TierRef, User, UserId};

#[derive(Default)]
struct UserState {
    users: HashMap<UserId, User>,
    /// Secondary index on the referral edge
    children: HashMap<UserId, BTreeSet<UserId>>,
}

/// User store over guarded maps with an indexed referral edge
#[derive(Default)]
pub struct MemoryUserStore {
    state: RwLock<UserState>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get(&self, user_id: &UserId) -> CoreResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.get(user_id).cloned())
    }

    async fn insert(&self, user: User) -> CoreResult<()> {
        let mut state = self.state.write().await;
        if let Some(referrer) = &user.referral_id {
            state
                .children
                .entry(referrer.clone())
                .or_default()
                .insert(user.user_id.clone());
        }
        state.users.insert(user.user_id.clone(), user);
        Ok(())
    }

    async fn children_of(&self, user_id: &UserId) -> CoreResult<Vec<UserId>> {
        let state = self.state.read().await;
        Ok(state
            .children
            .get(user_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn parent_of(&self, user_id: &UserId) -> CoreResult<Option<UserId>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(user_id)
            .and_then(|user| user.referral_id.clone()))
    }

    async fn set_referrer(&self, user_id: &UserId, referrer_id: &UserId) -> CoreResult<()> {
        let mut state = self.state.write().await;
        let previous = match state.users.get_mut(user_id) {
            Some(user) => user.referral_id.replace(referrer_id.clone()),
            None => return Err(CoreError::not_found("User", user_id.as_str())),
        };
        if let Some(previous) = previous {
            if let Some(set) = state.children.get_mut(&previous) {
                set.remove(user_id);
            }
        }
        state
            .children
            .entry(referrer_id.clone())
            .or_default()
            .insert(user_id.clone());
        Ok(())
    }

    async fn set_tier(&self, user_id: &UserId, tier: Option<TierRef>) -> CoreResult<()> {
        let mut state = self.state.write().await;
        match state.users.get_mut(user_id) {
            Some(user) => {
                user.tier = tier;
                Ok(())
            }
            None => Err(CoreError::not_found("User", user_id.as_str())),
        }
    }

    async fn adjust_balance(
        &self,
        user_id: &UserId,
        bucket: BalanceBucket,
        delta: Decimal,
    ) -> CoreResult<()> {
        let mut state = self.state.write().await;
        match state.users.get_mut(user_id) {
            Some(user) => {
                let field = match bucket {
                    BalanceBucket::Deposit => &mut user.deposit_balance,
                    BalanceBucket::Profit => &mut user.profit_balance,
                    BalanceBucket::ReferralCredit => &mut user.referral_credit_balance,
                    BalanceBucket::Reward => &mut user.reward_balance,
                };
                *field += delta;
                Ok(())
            }
            None => Err(CoreError::not_found("User", user_id.as_str())),
        }
    }

    async fn set_balance(
        &self,
        user_id: &UserId,
        bucket: BalanceBucket,
        value: Decimal,
    ) -> CoreResult<()> {
        let mut state = self.state.write().await;
        match state.users.get_mut(user_id) {
            Some(user) => {
                let field = match bucket {
                    BalanceBucket::Deposit => &mut user.deposit_balance,
                    BalanceBucket::Profit => &mut user.profit_balance,
                    BalanceBucket::ReferralCredit => &mut user.referral_credit_balance,
                    BalanceBucket::Reward => &mut user.reward_balance,
                };
                *field = value;
                Ok(())
            }
            None => Err(CoreError::not_found("User", user_id.as_str())),
        }
    }

    async fn active_invested(&self, page: Page) -> CoreResult<Vec<User>> {
        let state = self.state.read().await;
        let mut invested: Vec<&User> = state
            .users
            .values()
            .filter(|user| user.is_invested())
            .collect();
        invested.sort_by(|a, b| a.user_id.as_str().cmp(b.user_id.as_str()));
        Ok(invested
            .into_iter()
            .skip(page.offset())
            .take(page.page_size as usize)
            .cloned()
            .collect())
    }

    async fn list(&self, page: Page) -> CoreResult<Vec<User>> {
        let state = self.state.read().await;
        let mut all: Vec<&User> = state.users.values().collect();
        all.sort_by(|a, b| a.user_id.as_str().cmp(b.user_id.as_str()));
        Ok(all
            .into_iter()
            .skip(page.offset())
            .take(page.page_size as usize)
            .cloned()
            .collect())
    }
}
