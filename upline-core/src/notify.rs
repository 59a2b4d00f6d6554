//! Notification Sink
//!
//! Fire-and-forget delivery seam. Notification failures are logged and
//! never fail the financial operation that triggered them.

use crate::types::UserId;
use async_trait::async_trait;
use tracing::warn;

/// Kind of user-facing notification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    DepositApproved,
    WithdrawalRejected,
    ProfitApplied,
    ReferralCredit,
    RankReward,
}

impl NotificationKind {
    /// Get kind name
    pub fn name(&self) -> &'static str {
        match self {
            NotificationKind::DepositApproved => "deposit_approved",
            NotificationKind::WithdrawalRejected => "withdrawal_rejected",
            NotificationKind::ProfitApplied => "profit_applied",
            NotificationKind::ReferralCredit => "referral_credit",
            NotificationKind::RankReward => "rank_reward",
        }
    }
}

/// Notification delivery seam
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a notification; errors are the sink's problem
    async fn notify(&self, user_id: &UserId, kind: NotificationKind, message: &str);
}

/// Sink that drops everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

#[async_trait]
impl NotificationSink for NoopNotifier {
    async fn notify(&self, _user_id: &UserId, _kind: NotificationKind, _message: &str) {}
}

/// Sink that logs deliveries, used by binaries without a real channel
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify(&self, user_id: &UserId, kind: NotificationKind, message: &str) {
        warn!(
            user_id = %user_id,
            kind = kind.name(),
            message,
            "notification sink not configured, dropping"
        );
    }
}

/// Recording sink for tests
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    delivered: std::sync::Mutex<Vec<(UserId, NotificationKind, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far
    pub fn delivered(&self) -> Vec<(UserId, NotificationKind, String)> {
        self.delivered.lock().unwrap().clone()
    }

    /// Count of deliveries of one kind
    pub fn count_of(&self, kind: NotificationKind) -> usize {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .count()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, user_id: &UserId, kind: NotificationKind, message: &str) {
        self.delivered
            .lock()
            .unwrap()
            .push((user_id.clone(), kind, message.to_string()));
    }
}
