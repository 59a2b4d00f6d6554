//! In-memory transaction store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use upline_core::error::{CoreError, CoreResult};
use upline_core::store::{DateRange, TransactionStore};
use upline_core::types::{
    ApprovalStatus, Page, Transaction, TransactionId, TransactionType, UserId, WithdrawalBucket,
};

/// Append-only transaction store over a guarded map
#[derive(Default)]
pub struct MemoryTransactionStore {
    transactions: RwLock<HashMap<TransactionId, Transaction>>,
}

impl MemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn append(&self, transaction: Transaction) -> CoreResult<Transaction> {
        let mut transactions = self.transactions.write().await;
        transactions.insert(transaction.transaction_id.clone(), transaction.clone());
        Ok(transaction)
    }

    async fn get(&self, transaction_id: &TransactionId) -> CoreResult<Option<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions.get(transaction_id).cloned())
    }

    async fn transition_status(
        &self,
        transaction_id: &TransactionId,
        to: ApprovalStatus,
        now: DateTime<Utc>,
    ) -> CoreResult<Transaction> {
        let mut transactions = self.transactions.write().await;
        let transaction = transactions
            .get_mut(transaction_id)
            .ok_or_else(|| CoreError::not_found("Transaction", transaction_id.as_str()))?;
        transaction.transition(to, now)?;
        Ok(transaction.clone())
    }

    async fn sum_amount(
        &self,
        user_id: &UserId,
        transaction_type: TransactionType,
        statuses: &[ApprovalStatus],
        range: DateRange,
    ) -> CoreResult<Decimal> {
        let transactions = self.transactions.read().await;
        Ok(transactions
            .values()
            .filter(|tx| {
                tx.user_id == *user_id
                    && tx.transaction_type == transaction_type
                    && statuses.contains(&tx.status)
                    && range.contains(tx.created_at)
            })
            .map(|tx| tx.amount)
            .sum())
    }

    async fn sum_withdrawal_original(
        &self,
        user_id: &UserId,
        bucket: WithdrawalBucket,
        statuses: &[ApprovalStatus],
        range: DateRange,
    ) -> CoreResult<Decimal> {
        let transactions = self.transactions.read().await;
        Ok(transactions
            .values()
            .filter(|tx| {
                tx.user_id == *user_id
                    && tx.transaction_type == TransactionType::Withdrawal
                    && tx.withdrawal_bucket == Some(bucket)
                    && statuses.contains(&tx.status)
                    && range.contains(tx.created_at)
            })
            .map(|tx| tx.original_amount)
            .sum())
    }

    async fn first_approved_deposit_at(
        &self,
        user_id: &UserId,
    ) -> CoreResult<Option<DateTime<Utc>>> {
        let transactions = self.transactions.read().await;
        Ok(transactions
            .values()
            .filter(|tx| {
                tx.user_id == *user_id
                    && tx.transaction_type == TransactionType::Deposit
                    && tx.status == ApprovalStatus::Approved
            })
            .map(|tx| tx.created_at)
            .min())
    }

    async fn profit_exists(&self, user_id: &UserId, period_key: &str) -> CoreResult<bool> {
        let transactions = self.transactions.read().await;
        Ok(transactions.values().any(|tx| {
            tx.user_id == *user_id
                && tx.transaction_type == TransactionType::Profit
                && tx.period_key.as_deref() == Some(period_key)
        }))
    }

    async fn list_for_user(&self, user_id: &UserId, page: Page) -> CoreResult<Vec<Transaction>> {
        let transactions = self.transactions.read().await;
        let mut rows: Vec<Transaction> = transactions
            .values()
            .filter(|tx| tx.user_id == *user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .skip(page.offset())
            .take(page.page_size as usize)
            .collect())
    }
}
