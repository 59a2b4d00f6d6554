//! Upline Core - Referral-Network Balance and Rank Engine
//!
//! This crate implements the settlement core of the investment platform:
//! - **Ledger**: append-only transactions as the source of truth for
//!   every balance; cached balance fields are a rebuildable read path
//! - **Referral graph**: a forest of upward edges, walked at most eight
//!   levels in either direction, cycle-checked at edge writes
//! - **Balances**: deposit/profit/credit/equity/account/reward derived
//!   by filtered summation and downline aggregation
//! - **Ranks**: rolling 30-day periods over downline sales with linearly
//!   interpolated cash rewards
//! - **Distribution**: the daily tiered-profit batch and the synchronous
//!   credit fan-out on deposit approval, both idempotent per period
//!
//! Persistence is consumed through the traits in [`store`]; any document
//! store with indexed lookup and atomic single-field increments can back
//! them.

pub mod balance;
pub mod config;
pub mod constants;
pub mod distribution;
pub mod error;
pub mod graph;
pub mod ledger;
pub mod notify;
pub mod rank;
pub mod store;
pub mod types;

// Re-export error types
pub use error::{CoreError, CoreResult};

// Re-export all types
pub use types::*;

// Re-export engines
pub use balance::{BalanceAggregator, Balances};
pub use config::{period_key_for, ProfitSchedule};
pub use distribution::{CreditPropagator, DistributionEngine, PageOutcome, PropagationOutcome};
pub use graph::{
    AncestorRef, DescendantRef, ReferralAggregator, ReferralFilter, ReferralGraph,
};
pub use ledger::{LedgerConfig, LedgerService};
pub use notify::{
    LogNotifier, NoopNotifier, NotificationKind, NotificationSink, RecordingNotifier,
};
pub use rank::{RankEngine, RankInfo};
pub use store::{
    DateRange, ProgramStore, RankStore, RewardStore, TransactionStore, UserStore,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
