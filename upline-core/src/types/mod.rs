//! Domain types for the referral, ledger and rank engines

mod common;
mod program;
mod rank;
mod transaction;
mod user;

pub use common::*;
pub use program::*;
pub use rank::*;
pub use transaction::*;
pub use user::*;
