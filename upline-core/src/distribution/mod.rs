//! Profit Distribution and Credit Propagation
//!
//! Two write paths fan out from here: the daily batch that applies
//! tiered profit against every invested user's equity, and the
//! synchronous credit propagation that runs up the ancestor chain when a
//! deposit is approved.

mod job;
mod propagation;

pub use job::{DistributionEngine, PageOutcome};
pub use propagation::{CreditPropagator, PropagationOutcome};
