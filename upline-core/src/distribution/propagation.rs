//! Upward credit propagation

use crate::error::CoreResult;
use crate::graph::ReferralAggregator;
use crate::notify::{NotificationKind, NotificationSink};
use crate::store::{ProgramStore, TransactionStore, UserStore};
use crate::types::{BalanceBucket, Transaction, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

/// Result of one propagation fan-out
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropagationOutcome {
    /// Ancestors credited, with the amount each received
    pub credited: Vec<(UserId, Decimal)>,
    /// Ancestors skipped for lack of a program tier
    pub skipped: u64,
}

/// Fans a percentage of an approved deposit out to the depositor's
/// ancestor chain
///
/// Each ancestor with a known tier receives `amount x credit_percentage`
/// of its own current tier; ancestors without a tier are skipped. The
/// per-ancestor writes are independent atomic increments, so their order
/// does not matter.
pub struct CreditPropagator {
    users: Arc<dyn UserStore>,
    transactions: Arc<dyn TransactionStore>,
    programs: Arc<dyn ProgramStore>,
    referrals: ReferralAggregator,
    notifier: Arc<dyn NotificationSink>,
}

impl CreditPropagator {
    pub fn new(
        users: Arc<dyn UserStore>,
        transactions: Arc<dyn TransactionStore>,
        programs: Arc<dyn ProgramStore>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let referrals = ReferralAggregator::new(users.clone());
        Self {
            users,
            transactions,
            programs,
            referrals,
            notifier,
        }
    }

    /// Propagate credit for an approved deposit of `amount`
    pub async fn propagate(
        &self,
        depositor_id: &UserId,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> CoreResult<PropagationOutcome> {
        let ancestors = self.referrals.parent_referrers(depositor_id).await?;

        let mut outcome = PropagationOutcome::default();
        for ancestor in ancestors {
            let Some(user) = self.users.get(&ancestor.user_id).await? else {
                outcome.skipped += 1;
                continue;
            };
            let Some(tier) = user.tier else {
                outcome.skipped += 1;
                continue;
            };
            let Some(program) = self.programs.get(tier.level).await? else {
                outcome.skipped += 1;
                continue;
            };
            let Some(tier_row) = program.tier_at_sub_level(tier.sub_level) else {
                outcome.skipped += 1;
                continue;
            };

            let credit = amount * tier_row.credit_percentage / Decimal::ONE_HUNDRED;
            if credit.is_zero() {
                outcome.skipped += 1;
                continue;
            }

            self.transactions
                .append(Transaction::referral_credit(
                    ancestor.user_id.clone(),
                    credit,
                    now,
                ))
                .await?;
            self.users
                .adjust_balance(&ancestor.user_id, BalanceBucket::ReferralCredit, credit)
                .await?;
            self.notifier
                .notify(
                    &ancestor.user_id,
                    NotificationKind::ReferralCredit,
                    &format!("Referral credit of {credit} from your downline"),
                )
                .await;

            debug!(
                user_id = %ancestor.user_id,
                depositor_id = %depositor_id,
                distance = ancestor.distance,
                credit = %credit,
                "credit propagated"
            );
            outcome.credited.push((ancestor.user_id, credit));
        }

        Ok(outcome)
    }
}
