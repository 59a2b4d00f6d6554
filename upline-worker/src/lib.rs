//! Upline Worker - Batch Orchestration
//!
//! Scheduled work over the upline engines:
//! - [`DistributionRunner`]: the daily profit run, paged, cancellable
//!   between pages, checkpointed by page number
//! - [`RankSweep`]: consumes elapsed rank periods across the user base
//! - [`Reconciler`]: repairs cached balances that drifted from the
//!   ledger-derived truth
//!
//! Batch jobs are partial-failure tolerant: a user that fails to settle
//! is logged and counted, and the job moves on.

pub mod error;
pub mod reconcile;
pub mod runner;
pub mod sweep;

pub use error::{WorkerError, WorkerResult};
pub use reconcile::{ReconcileReport, Reconciler};
pub use runner::{DistributionRunner, RunReport, RunnerConfig};
pub use sweep::{RankSweep, SweepReport};
