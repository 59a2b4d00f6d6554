//! Shared test fixtures
//!
//! Each test binary uses a different slice of these helpers.
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use upline_core::balance::BalanceAggregator;
use upline_core::distribution::DistributionEngine;
use upline_core::ledger::{LedgerConfig, LedgerService};
use upline_core::notify::{NotificationSink, RecordingNotifier};
use upline_core::rank::RankEngine;
use upline_core::types::{TierRef, Transaction, User, UserId};
use upline_store::Stores;

pub struct TestContext {
    pub stores: Stores,
    pub balances: Arc<BalanceAggregator>,
    pub ledger: LedgerService,
    pub rank_engine: RankEngine,
    pub distribution: DistributionEngine,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestContext {
    /// Context with the default catalogs and no fees (amounts stay round)
    pub async fn new() -> Self {
        Self::with_fee(Decimal::ZERO).await
    }

    pub async fn with_fee(fee_rate: Decimal) -> Self {
        let stores = Stores::in_memory_seeded().await.unwrap();
        Self::build(stores, fee_rate)
    }

    /// Context over empty catalogs, for tests that seed their own
    pub async fn bare() -> Self {
        Self::build(Stores::in_memory(), Decimal::ZERO)
    }

    fn build(stores: Stores, fee_rate: Decimal) -> Self {
        let notifier = Arc::new(RecordingNotifier::new());
        let sink: Arc<dyn NotificationSink> = notifier.clone();

        let balances = Arc::new(BalanceAggregator::new(
            stores.users.clone(),
            stores.transactions.clone(),
            stores.rewards.clone(),
            stores.programs.clone(),
        ));
        let ledger = LedgerService::new(
            LedgerConfig { fee_rate },
            stores.users.clone(),
            stores.transactions.clone(),
            stores.rewards.clone(),
            stores.programs.clone(),
            balances.clone(),
            sink.clone(),
        );
        let rank_engine = RankEngine::new(
            stores.users.clone(),
            stores.transactions.clone(),
            stores.rewards.clone(),
            stores.ranks.clone(),
            balances.clone(),
            sink.clone(),
        );
        let distribution = DistributionEngine::new(
            stores.users.clone(),
            stores.transactions.clone(),
            balances.clone(),
            sink,
        );

        Self {
            stores,
            balances,
            ledger,
            rank_engine,
            distribution,
            notifier,
        }
    }

    pub async fn add_user(&self, id: &str, referrer: Option<&str>) -> UserId {
        self.add_user_at(id, referrer, Utc::now()).await
    }

    pub async fn add_user_at(
        &self,
        id: &str,
        referrer: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> UserId {
        let user_id = UserId::new(id);
        let user = User::new(user_id.clone(), referrer.map(UserId::new), created_at);
        self.stores.users.insert(user).await.unwrap();
        user_id
    }

    pub async fn set_tier(&self, id: &str, tier: TierRef) {
        self.stores
            .users
            .set_tier(&UserId::new(id), Some(tier))
            .await
            .unwrap();
    }

    /// Create and immediately approve a deposit at `at`
    pub async fn approved_deposit(
        &self,
        id: &str,
        amount: Decimal,
        at: DateTime<Utc>,
    ) -> Transaction {
        let pending = self
            .ledger
            .create_deposit(&UserId::new(id), amount, at)
            .await
            .unwrap();
        self.ledger
            .approve(&pending.transaction_id, at)
            .await
            .unwrap()
    }

    pub async fn user(&self, id: &str) -> User {
        self.stores
            .users
            .get(&UserId::new(id))
            .await
            .unwrap()
            .unwrap()
    }
}

/// Days before now
pub fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - chrono::Duration::days(days)
}
