use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::domain::entities::TransactionType;
use crate::domain::error::TransferError;
use crate::domain::repository::TransferRepository;
use crate::domain::transfer::{TransferOutcome, TransferRequest};
use crate::domain::types::{TransactionId, UserId};
use crate::infrastructure::persistence::models::{AssetRow, TransactionRow, WalletRow};
use crate::infrastructure::persistence::pg_errors::{is_contention, is_unique_violation};

const MAX_ATTEMPTS: u32 = 3;

/// Postgres-backed Transfer Engine: one call runs the full algorithm in
/// spec.md §4.1 inside a bounded retry loop.
pub struct PostgresTransferRepository {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PostgresTransferRepository {
    pub fn new(pool: PgPool, lock_timeout: Duration) -> Self {
        Self { pool, lock_timeout }
    }
}

/// Internal outcome of a single attempt — distinct from `TransferError`
/// so the retry loop can tell "retry me" apart from "give up and
/// surface this to the caller" without parsing error messages.
enum AttemptOutcome {
    Committed(TransferOutcome),
    Contention(String),
    /// Our transaction insert lost a unique-key race against a
    /// concurrent attempt with the same idempotency key; the whole
    /// attempt rolled back (no wallet mutation survives). The next
    /// attempt's idempotency probe will observe the winner.
    DuplicateRace,
    Domain(TransferError),
}

#[async_trait]
impl TransferRepository for PostgresTransferRepository {
    #[tracing::instrument(name = "PostgresTransferRepository::execute_transfer", skip(self, request), fields(idempotency_key = %request.idempotency_key))]
    async fn execute_transfer(
        &self,
        request: TransferRequest,
    ) -> Result<TransferOutcome, TransferError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.attempt(&request).await {
                AttemptOutcome::Committed(outcome) => return Ok(outcome),
                AttemptOutcome::Domain(e) => return Err(e),
                AttemptOutcome::DuplicateRace => continue,
                AttemptOutcome::Contention(msg) => {
                    if attempt >= MAX_ATTEMPTS {
                        return Err(TransferError::Contention(format!(
                            "exhausted {MAX_ATTEMPTS} attempts: {msg}"
                        )));
                    }
                    let backoff = Duration::from_millis(100u64 * 2u64.pow(attempt));
                    warn!(attempt, backoff_ms = backoff.as_millis() as u64, %msg, "contention, retrying transfer");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

impl PostgresTransferRepository {
    async fn attempt(&self, request: &TransferRequest) -> AttemptOutcome {
        let mut tx = match self.pool.begin().await {
            Ok(tx) => tx,
            Err(e) => return AttemptOutcome::Domain(infra(e)),
        };

        let lock_timeout_ms = self.lock_timeout.as_millis();
        if let Err(e) = sqlx::query(&format!("SET LOCAL lock_timeout = '{lock_timeout_ms}ms'"))
            .execute(&mut *tx)
            .await
        {
            return AttemptOutcome::Domain(infra(e));
        }

        // Step 2: DB-level idempotency probe — the durable backstop for
        // when the Fast Idempotency Cache was unavailable on a prior
        // attempt.
        match sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions WHERE idempotency_key = $1",
        )
        .bind(&request.idempotency_key)
        .fetch_optional(&mut *tx)
        .await
        {
            Ok(Some(row)) => {
                let user_wallet = match row.transaction_type {
                    TransactionType::Spend => row.from_wallet,
                    TransactionType::TopUp | TransactionType::Bonus => row.to_wallet,
                };
                let balance_after: Result<Decimal, sqlx::Error> = sqlx::query_scalar(
                    "SELECT balance_after FROM ledger_entries WHERE transaction_id = $1 AND wallet_id = $2",
                )
                .bind(row.id)
                .bind(user_wallet)
                .fetch_one(&mut *tx)
                .await;
                return match balance_after {
                    Ok(user_balance) => {
                        let _ = tx.commit().await;
                        AttemptOutcome::Committed(TransferOutcome {
                            tx_id: row.id,
                            user_balance,
                            replay: true,
                        })
                    }
                    Err(e) => AttemptOutcome::Domain(infra(e)),
                };
            }
            Ok(None) => {}
            Err(e) => return AttemptOutcome::Domain(infra(e)),
        }

        let asset = match sqlx::query_as::<_, AssetRow>("SELECT * FROM assets WHERE symbol = $1")
            .bind(&request.asset_symbol)
            .fetch_optional(&mut *tx)
            .await
        {
            Ok(Some(asset)) => asset,
            Ok(None) => {
                return AttemptOutcome::Domain(TransferError::UnknownAsset(
                    request.asset_symbol.clone(),
                ))
            }
            Err(e) => return AttemptOutcome::Domain(infra(e)),
        };

        // Step 3: canonical lock acquisition. Sorting by user id before
        // locking is the deadlock-prevention discipline — any two
        // concurrent transfers touching the same wallet pair attempt
        // locks in the same order, so no circular wait can form.
        let (lock_a, lock_b) = sorted_pair(request.from_user, request.to_user);
        let rows = match sqlx::query_as::<_, WalletRow>(
            "SELECT * FROM wallets WHERE asset_id = $1 AND user_id IN ($2, $3) ORDER BY user_id FOR UPDATE",
        )
        .bind(asset.id)
        .bind(lock_a)
        .bind(lock_b)
        .fetch_all(&mut *tx)
        .await
        {
            Ok(rows) => rows,
            Err(e) if is_contention(&e) => return AttemptOutcome::Contention(e.to_string()),
            Err(e) => return AttemptOutcome::Domain(infra(e)),
        };

        let from_row = rows.iter().find(|w| w.user_id == request.from_user).cloned();
        let to_row = rows.iter().find(|w| w.user_id == request.to_user).cloned();
        let (from_row, to_row) = match (from_row, to_row) {
            (Some(f), Some(t)) => (f, t),
            _ => {
                return AttemptOutcome::Domain(TransferError::WalletNotFound(format!(
                    "no wallet for user {} or {} in asset {}",
                    request.from_user, request.to_user, request.asset_symbol
                )))
            }
        };

        if from_row.balance < Decimal::ZERO {
            tracing::error!(wallet = %from_row.id, balance = %from_row.balance, "corruption: negative balance observed before debit");
            return AttemptOutcome::Domain(TransferError::Corruption {
                wallet: from_row.id,
                observed: from_row.balance.to_string(),
            });
        }
        if from_row.balance < request.amount {
            return AttemptOutcome::Domain(TransferError::InsufficientFunds(from_row.id));
        }

        let new_from = from_row.balance - request.amount;
        let new_to = to_row.balance + request.amount;

        if let Err(e) = sqlx::query("UPDATE wallets SET balance = $1 WHERE id = $2")
            .bind(new_from)
            .bind(from_row.id)
            .execute(&mut *tx)
            .await
        {
            return if is_contention(&e) {
                AttemptOutcome::Contention(e.to_string())
            } else {
                AttemptOutcome::Domain(infra(e))
            };
        }
        if let Err(e) = sqlx::query("UPDATE wallets SET balance = $1 WHERE id = $2")
            .bind(new_to)
            .bind(to_row.id)
            .execute(&mut *tx)
            .await
        {
            return if is_contention(&e) {
                AttemptOutcome::Contention(e.to_string())
            } else {
                AttemptOutcome::Domain(infra(e))
            };
        }

        let tx_id = TransactionId::new();
        if let Err(e) = sqlx::query(
            "INSERT INTO transactions (id, idempotency_key, from_wallet, to_wallet, amount, transaction_type, status) \
             VALUES ($1, $2, $3, $4, $5, $6, 'SUCCESS')",
        )
        .bind(tx_id)
        .bind(&request.idempotency_key)
        .bind(from_row.id)
        .bind(to_row.id)
        .bind(request.amount)
        .bind(request.transaction_type)
        .execute(&mut *tx)
        .await
        {
            return if is_unique_violation(&e, "transactions_idempotency_key_key") {
                AttemptOutcome::DuplicateRace
            } else if is_contention(&e) {
                AttemptOutcome::Contention(e.to_string())
            } else {
                AttemptOutcome::Domain(infra(e))
            };
        }

        // Step 9: both ledger entries in a single batch insert.
        let debit_id = Uuid::new_v4();
        let credit_id = Uuid::new_v4();
        if let Err(e) = sqlx::query(
            "INSERT INTO ledger_entries (id, transaction_id, wallet_id, entry_type, amount, balance_after) \
             VALUES ($1, $2, $3, 'DEBIT', $4, $5), ($6, $2, $7, 'CREDIT', $4, $8)",
        )
        .bind(debit_id)
        .bind(tx_id)
        .bind(from_row.id)
        .bind(request.amount)
        .bind(new_from)
        .bind(credit_id)
        .bind(to_row.id)
        .bind(new_to)
        .execute(&mut *tx)
        .await
        {
            return if is_contention(&e) {
                AttemptOutcome::Contention(e.to_string())
            } else {
                AttemptOutcome::Domain(infra(e))
            };
        }

        if let Err(e) = tx.commit().await {
            return AttemptOutcome::Domain(infra(e));
        }

        let user_balance = match request.transaction_type {
            TransactionType::Spend => new_from,
            TransactionType::TopUp | TransactionType::Bonus => new_to,
        };

        AttemptOutcome::Committed(TransferOutcome {
            tx_id,
            user_balance,
            replay: false,
        })
    }
}

fn sorted_pair(a: UserId, b: UserId) -> (UserId, UserId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn infra(e: sqlx::Error) -> TransferError {
    TransferError::Infrastructure(e.to_string())
}
