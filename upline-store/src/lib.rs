//! Upline Store - In-Memory Document Store
//!
//! Implements the `upline-core` store traits over `RwLock`-guarded maps.
//! The referral edge is indexed (`children_of` never scans), balance
//! adjustments are single-field writes under the store lock, and status
//! transitions check-and-write under the same lock so racing admins
//! cannot both win.
//!
//! A production deployment would put a document database behind the same
//! traits; everything above the traits is storage-agnostic.

pub mod memory;
pub mod seed;

pub use memory::{
    MemoryProgramStore, MemoryRankStore, MemoryRewardStore, MemoryTransactionStore,
    MemoryUserStore,
};
pub use seed::{default_programs, default_ranks, Stores};
