//! Rank Sweep
//!
//! Walks every user and consumes elapsed rank periods, creating the
//! automatic (unclaimed) period rewards. Per-user failures are logged
//! and tallied; the sweep keeps going.

use crate::error::WorkerResult;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use upline_core::rank::RankEngine;
use upline_core::store::UserStore;
use upline_core::types::Page;

/// Report for one rank sweep
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Users examined
    pub evaluated: u64,
    /// Rewards created for elapsed periods
    pub rewards_created: u64,
    /// Users whose evaluation failed
    pub failed: u64,
}

/// Periodic rank evaluation over the whole user base
pub struct RankSweep {
    users: Arc<dyn UserStore>,
    engine: Arc<RankEngine>,
    page_size: u32,
}

impl RankSweep {
    pub fn new(users: Arc<dyn UserStore>, engine: Arc<RankEngine>) -> Self {
        Self {
            users,
            engine,
            page_size: 100,
        }
    }

    /// Set the scan page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Evaluate every user once
    pub async fn run(&self, now: DateTime<Utc>) -> WorkerResult<SweepReport> {
        let mut report = SweepReport::default();
        let mut page = Page::first(self.page_size);

        loop {
            let users = self.users.list(page).await?;
            if users.is_empty() {
                break;
            }

            for user in &users {
                report.evaluated += 1;
                match self.engine.evaluate(&user.user_id, now).await {
                    Ok(Some(_)) => report.rewards_created += 1,
                    Ok(None) => {}
                    Err(error) => {
                        warn!(
                            user_id = %user.user_id,
                            error = %error,
                            "rank evaluation failed, continuing sweep"
                        );
                        report.failed += 1;
                    }
                }
            }
            page = page.next();
        }

        info!(
            evaluated = report.evaluated,
            rewards_created = report.rewards_created,
            failed = report.failed,
            "rank sweep finished"
        );
        Ok(report)
    }
}
