//! Balance Reconciliation
//!
//! The cached balance fields on user records are written by atomic
//! increments tied to ledger writes, but a missed increment or an
//! out-of-band edit leaves them drifted. This job recomputes every
//! balance from the ledger and the referral graph and overwrites any
//! cached field that disagrees.

use crate::error::WorkerResult;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use upline_core::balance::BalanceAggregator;
use upline_core::store::UserStore;
use upline_core::types::{BalanceBucket, Page, User};

/// Report for one reconciliation pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Users examined
    pub checked: u64,
    /// Cached fields corrected
    pub corrected: u64,
    /// Users whose recomputation failed
    pub failed: u64,
}

/// Cache-vs-ledger reconciliation job
pub struct Reconciler {
    users: Arc<dyn UserStore>,
    balances: Arc<BalanceAggregator>,
    page_size: u32,
}

impl Reconciler {
    pub fn new(users: Arc<dyn UserStore>, balances: Arc<BalanceAggregator>) -> Self {
        Self {
            users,
            balances,
            page_size: 100,
        }
    }

    /// Set the scan page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Reconcile every user's cached balances
    pub async fn run(&self) -> WorkerResult<ReconcileReport> {
        let mut report = ReconcileReport::default();
        let mut page = Page::first(self.page_size);

        loop {
            let users = self.users.list(page).await?;
            if users.is_empty() {
                break;
            }

            for user in &users {
                report.checked += 1;
                match self.reconcile_user(user).await {
                    Ok(corrected) => report.corrected += corrected,
                    Err(error) => {
                        warn!(
                            user_id = %user.user_id,
                            error = %error,
                            "reconciliation failed, continuing"
                        );
                        report.failed += 1;
                    }
                }
            }
            page = page.next();
        }

        info!(
            checked = report.checked,
            corrected = report.corrected,
            failed = report.failed,
            "reconciliation finished"
        );
        Ok(report)
    }

    /// Recompute one user's balances and fix any drifted field
    async fn reconcile_user(&self, user: &User) -> WorkerResult<u64> {
        let derived = self.balances.balances(&user.user_id).await?;
        let fields: [(BalanceBucket, Decimal, Decimal); 4] = [
            (BalanceBucket::Deposit, user.deposit_balance, derived.deposit),
            (BalanceBucket::Profit, user.profit_balance, derived.profit),
            (
                BalanceBucket::ReferralCredit,
                user.referral_credit_balance,
                derived.credit,
            ),
            (BalanceBucket::Reward, user.reward_balance, derived.reward),
        ];

        let mut corrected = 0u64;
        for (bucket, cached, derived_value) in fields {
            if cached != derived_value {
                warn!(
                    user_id = %user.user_id,
                    bucket = bucket.name(),
                    cached = %cached,
                    derived = %derived_value,
                    "balance drift corrected"
                );
                self.users
                    .set_balance(&user.user_id, bucket, derived_value)
                    .await?;
                corrected += 1;
            }
        }
        Ok(corrected)
    }
}
