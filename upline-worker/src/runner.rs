//! Distribution Runner
//!
//! Drives the daily profit distribution across pages of users until the
//! scan is exhausted. Cancellation is honored between pages and the
//! report carries the next unprocessed page, so an interrupted run
//! resumes from its checkpoint; the per-period idempotency guard in the
//! engine makes re-covering an already-settled page harmless.

use crate::error::{WorkerError, WorkerResult};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use upline_core::config::ProfitSchedule;
use upline_core::distribution::DistributionEngine;
use upline_core::types::Page;

/// Runner configuration
#[derive(Clone, Copy, Debug)]
pub struct RunnerConfig {
    /// Users per page
    pub page_size: u32,
    /// First page to process (checkpoint on resume)
    pub start_page: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            start_page: 1,
        }
    }
}

impl RunnerConfig {
    /// Resume from a checkpointed page
    pub fn with_start_page(mut self, page: u32) -> Self {
        self.start_page = page;
        self
    }
}

/// Report for one distribution run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Pages fully settled
    pub pages: u32,
    pub processed: u64,
    pub skipped: u64,
    pub failed: u64,
    /// Whether the run stopped on a cancellation signal
    pub cancelled: bool,
    /// First page not yet settled; the checkpoint for the next run
    pub next_page: u32,
}

/// Paged distribution driver with graceful cancellation
pub struct DistributionRunner {
    engine: Arc<DistributionEngine>,
    config: RunnerConfig,
    cancel: watch::Receiver<bool>,
}

impl DistributionRunner {
    /// Create a runner and the sender used to cancel it
    pub fn new(
        engine: Arc<DistributionEngine>,
        config: RunnerConfig,
    ) -> (Self, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                engine,
                config,
                cancel: rx,
            },
            tx,
        )
    }

    /// Run the distribution for one period until the user scan is
    /// exhausted or cancellation is requested
    pub async fn run(
        &self,
        schedule: &ProfitSchedule,
        period_key: &str,
        now: DateTime<Utc>,
    ) -> WorkerResult<RunReport> {
        if self.config.page_size == 0 {
            return Err(WorkerError::InvalidConfig {
                reason: "page_size must be positive".to_string(),
            });
        }
        schedule.validate()?;

        let mut report = RunReport {
            next_page: self.config.start_page,
            ..RunReport::default()
        };
        let mut page = Page::new(self.config.start_page, self.config.page_size);

        loop {
            if *self.cancel.borrow() {
                report.cancelled = true;
                warn!(
                    period_key,
                    next_page = report.next_page,
                    "distribution run cancelled, checkpoint recorded"
                );
                break;
            }

            let outcome = self.engine.run_page(page, schedule, period_key, now).await?;
            if outcome.scanned == 0 {
                break;
            }

            report.pages += 1;
            report.processed += outcome.processed;
            report.skipped += outcome.skipped;
            report.failed += outcome.failed;
            page = page.next();
            report.next_page = page.page;
        }

        info!(
            period_key,
            pages = report.pages,
            processed = report.processed,
            skipped = report.skipped,
            failed = report.failed,
            cancelled = report.cancelled,
            "distribution run finished"
        );
        Ok(report)
    }
}
