use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use crate::domain::entities::{
    Asset, EntryType, LedgerEntry, Transaction, TransactionStatus, TransactionType, User, Wallet,
};
use crate::domain::error::EntityError;
use crate::domain::types::{AssetId, TransactionId, UserId, WalletId};

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

impl TryFrom<UserRow> for User {
    type Error = EntityError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        User::reconstitute(r.id, r.email, r.name)
    }
}

#[derive(Debug, FromRow)]
pub struct AssetRow {
    pub id: AssetId,
    pub symbol: String,
    pub name: String,
}

impl TryFrom<AssetRow> for Asset {
    type Error = EntityError;

    fn try_from(r: AssetRow) -> Result<Self, Self::Error> {
        Asset::reconstitute(r.id, r.symbol, r.name)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct WalletRow {
    pub id: WalletId,
    pub user_id: UserId,
    pub asset_id: AssetId,
    pub balance: Decimal,
}

impl TryFrom<WalletRow> for Wallet {
    type Error = EntityError;

    fn try_from(r: WalletRow) -> Result<Self, Self::Error> {
        Wallet::reconstitute(r.id, r.user_id, r.asset_id, r.balance)
    }
}

#[derive(Debug, FromRow)]
pub struct TransactionRow {
    pub id: TransactionId,
    pub idempotency_key: String,
    pub from_wallet: WalletId,
    pub to_wallet: WalletId,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = EntityError;

    fn try_from(r: TransactionRow) -> Result<Self, Self::Error> {
        Transaction::reconstitute(
            r.id,
            r.idempotency_key,
            r.from_wallet,
            r.to_wallet,
            r.amount,
            r.transaction_type,
            r.status,
            r.created_at,
        )
    }
}

#[derive(Debug, FromRow)]
pub struct LedgerEntryRow {
    pub id: uuid::Uuid,
    pub transaction_id: TransactionId,
    pub wallet_id: WalletId,
    pub entry_type: EntryType,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<LedgerEntryRow> for LedgerEntry {
    type Error = EntityError;

    fn try_from(r: LedgerEntryRow) -> Result<Self, Self::Error> {
        LedgerEntry::reconstitute(
            r.id,
            r.transaction_id,
            r.wallet_id,
            r.entry_type,
            r.amount,
            r.balance_after,
            r.created_at,
        )
    }
}
