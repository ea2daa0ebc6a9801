use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{LedgerEntry, Transaction};
use crate::domain::error::ReadError;
use crate::domain::repository::{HistoryFilter, ReadRepository};
use crate::domain::types::{TransactionId, UserId};
use crate::infrastructure::persistence::models::{LedgerEntryRow, TransactionRow};

pub struct PostgresReadRepository {
    pool: PgPool,
}

impl PostgresReadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn resolve_asset_id(&self, symbol: &str) -> Result<Uuid, ReadError> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM assets WHERE symbol = $1")
            .bind(symbol)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ReadError::Infrastructure(e.to_string()))?
            .ok_or_else(|| ReadError::UnknownAsset(symbol.to_string()))
    }
}

#[async_trait]
impl ReadRepository for PostgresReadRepository {
    #[tracing::instrument(skip(self))]
    async fn get_balance(&self, user_id: UserId, asset_symbol: &str) -> Result<Decimal, ReadError> {
        let asset_id = self.resolve_asset_id(asset_symbol).await?;

        let balance = sqlx::query_scalar::<_, Decimal>(
            "SELECT balance FROM wallets WHERE user_id = $1 AND asset_id = $2",
        )
        .bind(user_id)
        .bind(asset_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ReadError::Infrastructure(e.to_string()))?;

        if let Some(balance) = balance {
            if balance < Decimal::ZERO {
                tracing::error!(%user_id, asset = asset_symbol, %balance, "negative balance observed on read");
            }
            return Ok(balance);
        }

        let user_exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ReadError::Infrastructure(e.to_string()))?;

        if user_exists {
            Err(ReadError::WalletNotFound)
        } else {
            Err(ReadError::UserNotFound)
        }
    }

    #[tracing::instrument(skip(self))]
    async fn get_ledger(
        &self,
        user_id: UserId,
        asset_symbol: Option<String>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<LedgerEntry>, i64), ReadError> {
        let asset_id = match asset_symbol.as_deref() {
            Some(symbol) => Some(self.resolve_asset_id(symbol).await?),
            None => None,
        };

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ledger_entries le \
             JOIN wallets w ON w.id = le.wallet_id \
             WHERE w.user_id = $1 AND ($2::uuid IS NULL OR w.asset_id = $2)",
        )
        .bind(user_id)
        .bind(asset_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ReadError::Infrastructure(e.to_string()))?;

        let rows = sqlx::query_as::<_, LedgerEntryRow>(
            "SELECT le.* FROM ledger_entries le \
             JOIN wallets w ON w.id = le.wallet_id \
             WHERE w.user_id = $1 AND ($2::uuid IS NULL OR w.asset_id = $2) \
             ORDER BY le.created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(user_id)
        .bind(asset_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ReadError::Infrastructure(e.to_string()))?;

        let entries = rows
            .into_iter()
            .map(LedgerEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((entries, total))
    }

    #[tracing::instrument(skip(self, filter))]
    async fn get_transaction_history(
        &self,
        user_id: UserId,
        filter: HistoryFilter,
    ) -> Result<(Vec<Transaction>, i64), ReadError> {
        let asset_id = match filter.asset_symbol.as_deref() {
            Some(symbol) => Some(self.resolve_asset_id(symbol).await?),
            None => None,
        };

        const WHERE: &str = "(fw.user_id = $1 OR tw.user_id = $1) \
             AND ($2::transaction_type IS NULL OR t.transaction_type = $2) \
             AND ($3::uuid IS NULL OR fw.asset_id = $3 OR tw.asset_id = $3) \
             AND ($4::timestamptz IS NULL OR t.created_at >= $4) \
             AND ($5::timestamptz IS NULL OR t.created_at <= $5)";

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM transactions t \
             JOIN wallets fw ON fw.id = t.from_wallet \
             JOIN wallets tw ON tw.id = t.to_wallet \
             WHERE {WHERE}"
        ))
        .bind(user_id)
        .bind(filter.transaction_type)
        .bind(asset_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ReadError::Infrastructure(e.to_string()))?;

        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT t.* FROM transactions t \
             JOIN wallets fw ON fw.id = t.from_wallet \
             JOIN wallets tw ON tw.id = t.to_wallet \
             WHERE {WHERE} \
             ORDER BY t.created_at DESC LIMIT $6 OFFSET $7"
        ))
        .bind(user_id)
        .bind(filter.transaction_type)
        .bind(asset_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ReadError::Infrastructure(e.to_string()))?;

        let transactions = rows
            .into_iter()
            .map(Transaction::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((transactions, total))
    }

    #[tracing::instrument(skip(self))]
    async fn get_transaction_by_id(
        &self,
        tx_id: TransactionId,
    ) -> Result<(Transaction, Vec<LedgerEntry>), ReadError> {
        let tx_row = sqlx::query_as::<_, TransactionRow>("SELECT * FROM transactions WHERE id = $1")
            .bind(tx_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ReadError::Infrastructure(e.to_string()))?
            .ok_or(ReadError::TransactionNotFound(tx_id))?;

        let entries = sqlx::query_as::<_, LedgerEntryRow>(
            "SELECT * FROM ledger_entries WHERE transaction_id = $1 ORDER BY entry_type",
        )
        .bind(tx_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ReadError::Infrastructure(e.to_string()))?;

        let transaction = Transaction::try_from(tx_row)?;
        let entries = entries
            .into_iter()
            .map(LedgerEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((transaction, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    async fn seed_user(pool: &PgPool, email: &str) -> UserId {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, email, name) VALUES ($1, $2, $2)")
            .bind(id)
            .bind(email)
            .execute(pool)
            .await
            .unwrap();
        UserId(id)
    }

    async fn seed_asset(pool: &PgPool, symbol: &str) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO assets (id, symbol, name) VALUES ($1, $2, $2)")
            .bind(id)
            .bind(symbol)
            .execute(pool)
            .await
            .unwrap();
        id
    }

    async fn seed_wallet(pool: &PgPool, user_id: UserId, asset_id: Uuid, balance: Decimal) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO wallets (id, user_id, asset_id, balance) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(user_id)
            .bind(asset_id)
            .bind(balance)
            .execute(pool)
            .await
            .unwrap();
        id
    }

    #[sqlx::test]
    async fn get_balance_returns_the_wallet_balance(pool: PgPool) -> sqlx::Result<()> {
        let alice = seed_user(&pool, "alice@example.com").await;
        let asset_id = seed_asset(&pool, "GOLD").await;
        seed_wallet(&pool, alice, asset_id, dec!(500)).await;

        let repo = PostgresReadRepository::new(pool);
        let balance = repo.get_balance(alice, "GOLD").await.unwrap();

        assert_eq!(balance, dec!(500));
        Ok(())
    }

    #[sqlx::test]
    async fn get_balance_distinguishes_missing_wallet_from_missing_user(pool: PgPool) -> sqlx::Result<()> {
        let alice = seed_user(&pool, "alice@example.com").await;
        seed_asset(&pool, "GOLD").await;

        let repo = PostgresReadRepository::new(pool);
        assert!(matches!(
            repo.get_balance(alice, "GOLD").await.unwrap_err(),
            ReadError::WalletNotFound
        ));
        assert!(matches!(
            repo.get_balance(UserId::new(), "GOLD").await.unwrap_err(),
            ReadError::UserNotFound
        ));
        Ok(())
    }

    #[sqlx::test]
    async fn get_ledger_filters_by_asset_and_reports_total(pool: PgPool) -> sqlx::Result<()> {
        let treasury = seed_user(&pool, "treasury@wallet.internal").await;
        let alice = seed_user(&pool, "alice@example.com").await;
        let gold_id = seed_asset(&pool, "GOLD").await;
        let silver_id = seed_asset(&pool, "SILVER").await;
        let gold_wallet = seed_wallet(&pool, alice, gold_id, dec!(500)).await;
        let silver_wallet = seed_wallet(&pool, alice, silver_id, dec!(10)).await;
        let treasury_gold = seed_wallet(&pool, treasury, gold_id, dec!(1000000000)).await;

        let tx_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO transactions (id, idempotency_key, from_wallet, to_wallet, amount, transaction_type, status) \
             VALUES ($1, 'seed-1', $2, $3, 100, 'TOP_UP', 'SUCCESS')",
        )
        .bind(tx_id)
        .bind(treasury_gold)
        .bind(gold_wallet)
        .execute(&pool)
        .await?;
        sqlx::query(
            "INSERT INTO ledger_entries (id, transaction_id, wallet_id, entry_type, amount, balance_after) \
             VALUES ($1, $2, $3, 'DEBIT', 100, 999999900), ($4, $2, $5, 'CREDIT', 100, 600)",
        )
        .bind(Uuid::new_v4())
        .bind(tx_id)
        .bind(treasury_gold)
        .bind(Uuid::new_v4())
        .bind(gold_wallet)
        .execute(&pool)
        .await?;

        let tx_id_2 = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO transactions (id, idempotency_key, from_wallet, to_wallet, amount, transaction_type, status) \
             VALUES ($1, 'seed-2', $2, $3, 5, 'TOP_UP', 'SUCCESS')",
        )
        .bind(tx_id_2)
        .bind(treasury_gold)
        .bind(silver_wallet)
        .execute(&pool)
        .await?;
        sqlx::query(
            "INSERT INTO ledger_entries (id, transaction_id, wallet_id, entry_type, amount, balance_after) \
             VALUES ($1, $2, $3, 'CREDIT', 5, 10)",
        )
        .bind(Uuid::new_v4())
        .bind(tx_id_2)
        .bind(silver_wallet)
        .execute(&pool)
        .await?;

        let repo = PostgresReadRepository::new(pool);
        let (entries, total) = repo
            .get_ledger(alice, Some("GOLD".to_string()), 10, 0)
            .await
            .unwrap();

        assert_eq!(total, 1);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].wallet_id().0, gold_wallet);

        Ok(())
    }

    #[sqlx::test]
    async fn get_transaction_by_id_round_trips(pool: PgPool) -> sqlx::Result<()> {
        let treasury = seed_user(&pool, "treasury@wallet.internal").await;
        let alice = seed_user(&pool, "alice@example.com").await;
        let asset_id = seed_asset(&pool, "GOLD").await;
        let treasury_wallet = seed_wallet(&pool, treasury, asset_id, dec!(1000000000)).await;
        let alice_wallet = seed_wallet(&pool, alice, asset_id, dec!(500)).await;

        let tx_id = TransactionId::new();
        sqlx::query(
            "INSERT INTO transactions (id, idempotency_key, from_wallet, to_wallet, amount, transaction_type, status) \
             VALUES ($1, 'seed-3', $2, $3, 100, 'TOP_UP', 'SUCCESS')",
        )
        .bind(tx_id)
        .bind(treasury_wallet)
        .bind(alice_wallet)
        .execute(&pool)
        .await?;
        sqlx::query(
            "INSERT INTO ledger_entries (id, transaction_id, wallet_id, entry_type, amount, balance_after) \
             VALUES ($1, $2, $3, 'DEBIT', 100, 999999900), ($4, $2, $5, 'CREDIT', 100, 600)",
        )
        .bind(Uuid::new_v4())
        .bind(tx_id)
        .bind(treasury_wallet)
        .bind(Uuid::new_v4())
        .bind(alice_wallet)
        .execute(&pool)
        .await?;

        let repo = PostgresReadRepository::new(pool);
        let (tx, entries) = repo.get_transaction_by_id(tx_id).await.unwrap();

        assert_eq!(tx.id(), tx_id);
        assert_eq!(entries.len(), 2);

        assert!(matches!(
            repo.get_transaction_by_id(TransactionId::new()).await.unwrap_err(),
            ReadError::TransactionNotFound(_)
        ));

        Ok(())
    }
}
