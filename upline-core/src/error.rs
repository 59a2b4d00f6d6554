//! Upline Error Codes Registry
//!
//! Error code format: UP-{module}-{sequence}
//! - UP-GRAPH: Referral graph violations
//! - UP-LEDGER: Transaction lifecycle errors
//! - UP-RANK: Rank period and reward errors
//! - UP-DIST: Distribution job errors

use thiserror::Error;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    // ============================================================
    // Graph Errors (UP-GRAPH-*)
    // ============================================================
    /// [UP-GRAPH-001] Referral edge would create a cycle
    #[error("[UP-GRAPH-001] Referral edge {user_id} -> {referrer_id} would create a cycle")]
    ReferralCycle { user_id: String, referrer_id: String },

    /// [UP-GRAPH-002] Referral chain is corrupt (revisited a node while
    /// walking upward)
    #[error("[UP-GRAPH-002] Referral chain above {user_id} revisits {repeated_id}")]
    CorruptReferralChain {
        user_id: String,
        repeated_id: String,
    },

    // ============================================================
    // Ledger Errors (UP-LEDGER-*)
    // ============================================================
    /// [UP-LEDGER-001] Withdrawal exceeds the available balance
    #[error("[UP-LEDGER-001] Insufficient {bucket} balance: requested {requested}, available {available}")]
    InsufficientBalance {
        bucket: String,
        requested: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    },

    /// [UP-LEDGER-002] Status transition on an already-terminal record
    #[error("[UP-LEDGER-002] {entity} {id} is already {status}; transitions are terminal")]
    StaleTransition {
        entity: String,
        id: String,
        status: String,
    },

    /// [UP-LEDGER-003] Invalid amount
    #[error("[UP-LEDGER-003] Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// [UP-LEDGER-004] Withdrawal is missing its balance bucket
    #[error("[UP-LEDGER-004] Withdrawal {id} has no withdrawal bucket")]
    MissingWithdrawalBucket { id: String },

    // ============================================================
    // Rank Errors (UP-RANK-*)
    // ============================================================
    /// [UP-RANK-001] No rank period has started for the user
    #[error("[UP-RANK-001] No rank period active for user {user_id}")]
    RankPeriodNotStarted { user_id: String },

    /// [UP-RANK-002] A period is active but no rank was reached
    #[error("[UP-RANK-002] User {user_id} has not reached a rank in the current period")]
    RankNotReached { user_id: String },

    // ============================================================
    // Distribution Errors (UP-DIST-*)
    // ============================================================
    /// [UP-DIST-001] Profit schedule has no rate for the level
    #[error("[UP-DIST-001] Profit schedule {version} has no rate for level {level}")]
    ScheduleRateMissing { version: String, level: String },

    /// [UP-DIST-002] Profit schedule is malformed
    #[error("[UP-DIST-002] Invalid profit schedule: {reason}")]
    InvalidSchedule { reason: String },

    // ============================================================
    // General Errors
    // ============================================================
    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Validation error
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation {
            message: message.into(),
        }
    }

    /// Create a stale transition error
    pub fn stale(entity: impl Into<String>, id: impl Into<String>, status: impl Into<String>) -> Self {
        CoreError::StaleTransition {
            entity: entity.into(),
            id: id.into(),
            status: status.into(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_in_messages() {
        let err = CoreError::ReferralCycle {
            user_id: "user:1".to_string(),
            referrer_id: "user:2".to_string(),
        };
        assert!(err.to_string().starts_with("[UP-GRAPH-001]"));

        let err = CoreError::RankPeriodNotStarted {
            user_id: "user:1".to_string(),
        };
        assert!(err.to_string().starts_with("[UP-RANK-001]"));
    }

    #[test]
    fn test_not_found_helper() {
        let err = CoreError::not_found("User", "user:9");
        assert_eq!(err.to_string(), "User not found: user:9");
    }
}
