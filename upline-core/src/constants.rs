//! Platform-wide constants

use rust_decimal::Decimal;

/// Maximum referral-graph traversal depth, both downward (descendant
/// aggregation) and upward (credit propagation).
pub const MAX_REFERRAL_DEPTH: u8 = 8;

/// Length of a rank period in days. A period becomes eligible for
/// automatic reward evaluation once this many days have elapsed.
pub const RANK_PERIOD_DAYS: i64 = 30;

/// Default fee rate applied to deposits and withdrawals (5%).
///
/// Profit and referral-credit transactions are fee-exempt.
pub fn default_fee_rate() -> Decimal {
    Decimal::new(5, 2)
}
