use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{LedgerEntry, Transaction, TransactionType};
use crate::domain::error::{ReadError, TransferError};
use crate::domain::transfer::{TransferOutcome, TransferRequest};
use crate::domain::types::{TransactionId, UserId};

/// Port for the Transfer Engine: a single call runs the whole algorithm
/// in §4.1 (session config, idempotency probe, canonical lock
/// acquisition, balance check, mutation, transaction + ledger insert,
/// commit) inside one PS transaction, with the bounded retry policy.
#[async_trait]
pub trait TransferRepository: Send + Sync {
    async fn execute_transfer(
        &self,
        request: TransferRequest,
    ) -> Result<TransferOutcome, TransferError>;
}

/// Optional filter for `ReadRepository::get_transaction_history`.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub transaction_type: Option<TransactionType>,
    pub asset_symbol: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
}

/// Port for the four read-only projections (spec.md §4.4). Every method
/// returns the total matching row count alongside the page so
/// `hasMore = offset + returned < total` can be computed by the caller.
#[async_trait]
pub trait ReadRepository: Send + Sync {
    async fn get_balance(
        &self,
        user_id: UserId,
        asset_symbol: &str,
    ) -> Result<rust_decimal::Decimal, ReadError>;

    async fn get_ledger(
        &self,
        user_id: UserId,
        asset_symbol: Option<String>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<LedgerEntry>, i64), ReadError>;

    async fn get_transaction_history(
        &self,
        user_id: UserId,
        filter: HistoryFilter,
    ) -> Result<(Vec<Transaction>, i64), ReadError>;

    async fn get_transaction_by_id(
        &self,
        tx_id: TransactionId,
    ) -> Result<(Transaction, Vec<LedgerEntry>), ReadError>;
}

/// Port used once at boot to resolve the Treasury's user id from its
/// well-known email (spec.md §4.3). Deliberately not on the hot-path
/// traits above: callers memoize the result in `AppState`.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user_id_by_email(&self, email: &str) -> anyhow::Result<Option<UserId>>;
}
