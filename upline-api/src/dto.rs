//! Request and Response DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use upline_core::balance::Balances;
use upline_core::distribution::PageOutcome;
use upline_core::graph::DescendantRef;
use upline_core::rank::RankInfo;
use upline_core::types::{Paginated, Rank, Reward, Transaction};

// ============================================================
// Requests
// ============================================================

/// Create a deposit
#[derive(Debug, Deserialize)]
pub struct CreateDepositRequest {
    pub user_id: String,
    pub amount: Decimal,
}

/// Create a withdrawal
#[derive(Debug, Deserialize)]
pub struct CreateWithdrawalRequest {
    pub user_id: String,
    pub amount: Decimal,
    /// Which balance bucket to draw from: deposit | profit | reward
    pub bucket: String,
}

/// Reject a reward
#[derive(Debug, Deserialize)]
pub struct RejectRewardRequest {
    pub reason: String,
}

/// Assign a referral edge
#[derive(Debug, Deserialize)]
pub struct AssignReferrerRequest {
    pub referrer_id: String,
}

/// Referral listing query parameters
#[derive(Debug, Deserialize)]
pub struct ReferralsQuery {
    /// direct | indirect
    #[serde(rename = "type")]
    pub referral_type: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Restrict indirect listings to one depth
    pub level: Option<u8>,
}

/// Plain paging parameters
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Run one page of the daily distribution
#[derive(Debug, Deserialize)]
pub struct RunDistributionRequest {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Defaults to today's period
    pub period_key: Option<String>,
}

/// Replace the profit schedule
#[derive(Debug, Deserialize)]
pub struct SetScheduleRequest {
    pub version: String,
    pub valid_from: DateTime<Utc>,
    /// Rate by level name (A-E)
    pub rates: std::collections::HashMap<String, Decimal>,
}

// ============================================================
// Responses
// ============================================================

/// All six balances
#[derive(Debug, Serialize)]
pub struct BalancesResponse {
    pub user_id: String,
    pub deposit: Decimal,
    pub profit: Decimal,
    pub credit: Decimal,
    pub equity: Decimal,
    pub account: Decimal,
    pub reward: Decimal,
}

impl BalancesResponse {
    pub fn from_balances(user_id: &str, balances: Balances) -> Self {
        Self {
            user_id: user_id.to_string(),
            deposit: balances.deposit,
            profit: balances.profit,
            credit: balances.credit,
            equity: balances.equity,
            account: balances.account,
            reward: balances.reward,
        }
    }
}

/// One referral entry
#[derive(Debug, Serialize)]
pub struct ReferralEntry {
    pub user_id: String,
    /// Distance from the listing root; 1 is a direct referral
    pub depth: u8,
}

impl From<DescendantRef> for ReferralEntry {
    fn from(descendant: DescendantRef) -> Self {
        Self {
            user_id: descendant.user_id.as_str().to_string(),
            depth: descendant.depth,
        }
    }
}

/// Paged referral listing
#[derive(Debug, Serialize)]
pub struct ReferralsResponse {
    pub items: Vec<ReferralEntry>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl From<Paginated<DescendantRef>> for ReferralsResponse {
    fn from(page: Paginated<DescendantRef>) -> Self {
        Self {
            items: page.items.into_iter().map(ReferralEntry::from).collect(),
            page: page.page,
            page_size: page.page_size,
            total: page.total,
        }
    }
}

/// Matched rank summary
#[derive(Debug, Serialize)]
pub struct RankSummary {
    pub rank_id: String,
    pub title: String,
    pub reward_from: Decimal,
    pub reward_to: Decimal,
}

impl From<Rank> for RankSummary {
    fn from(rank: Rank) -> Self {
        Self {
            rank_id: rank.rank_id.as_str().to_string(),
            title: rank.title,
            reward_from: rank.reward_from,
            reward_to: rank.reward_to,
        }
    }
}

/// Rank period snapshot
#[derive(Debug, Serialize)]
pub struct RankInfoResponse {
    pub period_start: Option<DateTime<Utc>>,
    pub direct_count: u64,
    pub indirect_count: u64,
    pub sales: Decimal,
    pub rank: Option<RankSummary>,
    /// Reward auto-created by this request when the period had elapsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_reward: Option<RewardResponse>,
}

impl RankInfoResponse {
    pub fn empty() -> Self {
        Self {
            period_start: None,
            direct_count: 0,
            indirect_count: 0,
            sales: Decimal::ZERO,
            rank: None,
            auto_reward: None,
        }
    }

    pub fn from_info(info: RankInfo, auto_reward: Option<Reward>) -> Self {
        Self {
            period_start: Some(info.period_start),
            direct_count: info.direct_count,
            indirect_count: info.indirect_count,
            sales: info.sales,
            rank: info.rank.map(RankSummary::from),
            auto_reward: auto_reward.map(RewardResponse::from),
        }
    }
}

/// Reward record
#[derive(Debug, Serialize)]
pub struct RewardResponse {
    pub reward_id: String,
    pub user_id: String,
    pub rank_id: Option<String>,
    pub amount: Decimal,
    pub sales: Decimal,
    pub direct_count: u64,
    pub indirect_count: u64,
    pub is_claimed: bool,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Reward> for RewardResponse {
    fn from(reward: Reward) -> Self {
        Self {
            reward_id: reward.reward_id.as_str().to_string(),
            user_id: reward.user_id.as_str().to_string(),
            rank_id: reward.rank_id.map(|id| id.as_str().to_string()),
            amount: reward.amount,
            sales: reward.sales,
            direct_count: reward.direct_count,
            indirect_count: reward.indirect_count,
            is_claimed: reward.is_claimed,
            status: reward.status.name().to_string(),
            reason: reward.reason,
            created_at: reward.created_at,
        }
    }
}

/// Transaction record
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub transaction_id: String,
    pub user_id: String,
    pub transaction_type: String,
    pub status: String,
    pub amount: Decimal,
    pub original_amount: Decimal,
    pub fees_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub withdrawal_bucket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            transaction_id: tx.transaction_id.as_str().to_string(),
            user_id: tx.user_id.as_str().to_string(),
            transaction_type: tx.transaction_type.name().to_string(),
            status: tx.status.name().to_string(),
            amount: tx.amount,
            original_amount: tx.original_amount,
            fees_amount: tx.fees_amount,
            withdrawal_bucket: tx.withdrawal_bucket.map(|b| b.name().to_string()),
            period_key: tx.period_key,
            created_at: tx.created_at,
        }
    }
}

/// Distribution page outcome
#[derive(Debug, Serialize)]
pub struct DistributionRunResponse {
    pub period_key: String,
    pub page: u32,
    pub processed: u64,
    pub skipped: u64,
    pub failed: u64,
    pub scanned: u64,
}

impl DistributionRunResponse {
    pub fn from_outcome(period_key: &str, page: u32, outcome: PageOutcome) -> Self {
        Self {
            period_key: period_key.to_string(),
            page,
            processed: outcome.processed,
            skipped: outcome.skipped,
            failed: outcome.failed,
            scanned: outcome.scanned,
        }
    }
}

/// Service statistics
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub service: String,
    pub version: String,
    pub uptime_secs: u64,
    pub requests: u64,
    pub schedule_version: String,
}

/// Health check body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}
