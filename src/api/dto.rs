use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{EntryType, LedgerEntry, Transaction, TransactionType};

/// Wire shape for a ledger line. Kept separate from `domain::entities`
/// so the storage row shape and the HTTP contract can evolve
/// independently (spec.md §9: the engine never sees the envelope).
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryDto {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub wallet_id: Uuid,
    pub entry_type: EntryType,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<LedgerEntry> for LedgerEntryDto {
    fn from(e: LedgerEntry) -> Self {
        Self {
            id: e.id(),
            transaction_id: e.transaction_id().0,
            wallet_id: e.wallet_id().0,
            entry_type: e.entry_type(),
            amount: e.amount(),
            balance_after: e.balance_after(),
            created_at: e.created_at(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub id: Uuid,
    pub idempotency_key: String,
    pub from_wallet: Uuid,
    pub to_wallet: Uuid,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionDto {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id().0,
            idempotency_key: t.idempotency_key().to_string(),
            from_wallet: t.from_wallet().0,
            to_wallet: t.to_wallet().0,
            amount: t.amount(),
            transaction_type: t.transaction_type(),
            created_at: t.created_at(),
        }
    }
}
