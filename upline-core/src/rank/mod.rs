//! Rank Engine
//!
//! Rank evaluation runs in periods. A period starts at the user's most
//! recent unclaimed reward, or failing that at the earliest approved
//! deposit anywhere in the downline; it is consumed by writing a reward
//! record (with or without a matched rank), at which point the next
//! period begins at that record's timestamp.

mod engine;

pub use engine::{RankEngine, RankInfo};
