//! Referral Graph
//!
//! Each user carries at most one upward referral edge, so the graph is a
//! forest. Traversal is bounded to [`crate::constants::MAX_REFERRAL_DEPTH`]
//! hops in either direction; edge writes reject cycles.

mod aggregator;
mod traversal;

pub use aggregator::{ReferralAggregator, ReferralFilter};
pub use traversal::{AncestorRef, DescendantRef, ReferralGraph};
