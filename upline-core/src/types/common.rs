//! Basic Types
//!
//! Naming conventions:
//! - `_id` suffix: Primary key identifiers
//! - `_balance` suffix: Decimal money amounts
//!
//! Identifiers are string newtypes so user, transaction, reward and rank
//! ids are not interchangeable.

use serde::{Deserialize, Serialize};

// ============================================================
// ID Types
// ============================================================

/// User ID
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction ID
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(format!("txn:{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reward ID
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RewardId(pub String);

impl RewardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(format!("reward:{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RewardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rank ID
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RankId(pub String);

impl RankId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RankId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================
// Core Enums
// ============================================================

/// Approval status shared by transactions and rewards
///
/// Records are created Pending and transition exactly once to Approved
/// or Rejected by an administrative action. The transition is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    /// Get status name for error messages
    pub fn name(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    /// Check whether the status is terminal
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Investment program level (A is the entry level)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvestmentLevel {
    A,
    B,
    C,
    D,
    E,
}

impl InvestmentLevel {
    /// Get level name
    pub fn name(&self) -> &'static str {
        match self {
            InvestmentLevel::A => "A",
            InvestmentLevel::B => "B",
            InvestmentLevel::C => "C",
            InvestmentLevel::D => "D",
            InvestmentLevel::E => "E",
        }
    }

    /// All levels in ascending order
    pub fn all() -> [InvestmentLevel; 5] {
        [
            InvestmentLevel::A,
            InvestmentLevel::B,
            InvestmentLevel::C,
            InvestmentLevel::D,
            InvestmentLevel::E,
        ]
    }

    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A" | "a" => Some(InvestmentLevel::A),
            "B" | "b" => Some(InvestmentLevel::B),
            "C" | "c" => Some(InvestmentLevel::C),
            "D" | "d" => Some(InvestmentLevel::D),
            "E" | "e" => Some(InvestmentLevel::E),
            _ => None,
        }
    }
}

impl std::fmt::Display for InvestmentLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================
// Pagination
// ============================================================

/// Page request (1-based page number)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page: u32,
    pub page_size: u32,
}

impl Page {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// First page with the given size
    pub fn first(page_size: u32) -> Self {
        Self { page: 1, page_size }
    }

    /// Offset into the result set
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.page_size as usize
    }

    /// The following page
    pub fn next(&self) -> Self {
        Self {
            page: self.page + 1,
            page_size: self.page_size,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 50,
        }
    }
}

/// A page of results with the total count
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: Page, total: u64) -> Self {
        Self {
            items,
            page: page.page,
            page_size: page.page_size,
            total,
        }
    }

    pub fn empty(page: Page) -> Self {
        Self {
            items: Vec::new(),
            page: page.page,
            page_size: page.page_size,
            total: 0,
        }
    }
}
