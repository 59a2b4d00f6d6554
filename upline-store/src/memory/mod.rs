//! In-memory store implementations

mod catalog;
mod rewards;
mod transactions;
mod users;

pub use catalog::{MemoryProgramStore, MemoryRankStore};
pub use rewards::MemoryRewardStore;
pub use transactions::MemoryTransactionStore;
pub use users::MemoryUserStore;
