//! Application State
//!
//! Shared state for the upline API service: configuration, the store
//! handles, and one instance of each engine wired over them.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use upline_core::balance::BalanceAggregator;
use upline_core::config::ProfitSchedule;
use upline_core::distribution::DistributionEngine;
use upline_core::graph::{ReferralAggregator, ReferralGraph};
use upline_core::ledger::{LedgerConfig, LedgerService};
use upline_core::notify::{LogNotifier, NotificationSink};
use upline_core::rank::RankEngine;
use upline_core::types::InvestmentLevel;
use upline_store::Stores;

/// Application configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Service name
    pub service_name: String,
    /// Service version
    pub version: String,
    /// Listen address
    pub listen_addr: String,
    /// Enable CORS
    pub enable_cors: bool,
    /// Fee rate for deposits and withdrawals
    pub fee_rate: rust_decimal::Decimal,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            service_name: "upline-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            listen_addr: "0.0.0.0:3000".to_string(),
            enable_cors: true,
            fee_rate: upline_core::constants::default_fee_rate(),
        }
    }
}

/// Application state shared across handlers
pub struct AppState {
    /// Configuration
    pub config: ApiConfig,
    /// Store handles
    pub stores: Stores,
    /// Balance aggregator
    pub balances: Arc<BalanceAggregator>,
    /// Referral aggregation
    pub referrals: ReferralAggregator,
    /// Referral graph (edge mutations)
    pub graph: ReferralGraph,
    /// Transaction lifecycle
    pub ledger: LedgerService,
    /// Rank engine
    pub rank_engine: RankEngine,
    /// Daily distribution
    pub distribution: DistributionEngine,
    /// Current profit schedule, replaced wholesale on update
    schedule: RwLock<ProfitSchedule>,
    /// Service start time
    pub started_at: DateTime<Utc>,
    /// Request counter
    request_counter: RwLock<u64>,
}

impl AppState {
    /// Create state over the given stores with the default notifier
    pub fn new(config: ApiConfig, stores: Stores) -> Self {
        Self::with_notifier(config, stores, Arc::new(LogNotifier))
    }

    /// Create state with an explicit notification sink
    pub fn with_notifier(
        config: ApiConfig,
        stores: Stores,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let balances = Arc::new(BalanceAggregator::new(
            stores.users.clone(),
            stores.transactions.clone(),
            stores.rewards.clone(),
            stores.programs.clone(),
        ));
        let referrals = ReferralAggregator::new(stores.users.clone());
        let graph = ReferralGraph::new(stores.users.clone());
        let ledger = LedgerService::new(
            LedgerConfig {
                fee_rate: config.fee_rate,
            },
            stores.users.clone(),
            stores.transactions.clone(),
            stores.rewards.clone(),
            stores.programs.clone(),
            balances.clone(),
            notifier.clone(),
        );
        let rank_engine = RankEngine::new(
            stores.users.clone(),
            stores.transactions.clone(),
            stores.rewards.clone(),
            stores.ranks.clone(),
            balances.clone(),
            notifier.clone(),
        );
        let distribution = DistributionEngine::new(
            stores.users.clone(),
            stores.transactions.clone(),
            balances.clone(),
            notifier,
        );

        Self {
            config,
            stores,
            balances,
            referrals,
            graph,
            ledger,
            rank_engine,
            distribution,
            schedule: RwLock::new(default_schedule()),
            started_at: Utc::now(),
            request_counter: RwLock::new(0),
        }
    }

    /// Get service uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        let now = Utc::now();
        (now - self.started_at).num_seconds().max(0) as u64
    }

    /// Increment request counter
    pub async fn increment_requests(&self) -> u64 {
        let mut counter = self.request_counter.write().await;
        *counter += 1;
        *counter
    }

    /// Get request count
    pub async fn request_count(&self) -> u64 {
        *self.request_counter.read().await
    }

    /// Snapshot of the current profit schedule
    pub async fn current_schedule(&self) -> ProfitSchedule {
        self.schedule.read().await.clone()
    }

    /// Replace the profit schedule
    pub async fn set_schedule(&self, schedule: ProfitSchedule) {
        *self.schedule.write().await = schedule;
    }
}

/// Flat 1% daily schedule used until an operator uploads a real one
fn default_schedule() -> ProfitSchedule {
    let mut rates = std::collections::HashMap::new();
    for level in InvestmentLevel::all() {
        rates.insert(level, rust_decimal::Decimal::ONE);
    }
    ProfitSchedule::new("v1-default", Utc::now(), rates)
}
