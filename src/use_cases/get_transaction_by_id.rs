use std::sync::Arc;

use crate::domain::entities::{LedgerEntry, Transaction};
use crate::domain::error::ReadError;
use crate::domain::repository::ReadRepository;
use crate::domain::types::TransactionId;

/// `GetTransactionById` read projection (spec.md §4.4).
#[derive(Clone)]
pub struct GetTransactionByIdUseCase {
    read_repo: Arc<dyn ReadRepository>,
}

impl GetTransactionByIdUseCase {
    pub fn new(read_repo: Arc<dyn ReadRepository>) -> Self {
        Self { read_repo }
    }

    #[tracing::instrument(name = "GetTransactionByIdUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        tx_id: TransactionId,
    ) -> Result<(Transaction, Vec<LedgerEntry>), ReadError> {
        self.read_repo.get_transaction_by_id(tx_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{EntryType, TransactionStatus, TransactionType};
    use crate::domain::repository::HistoryFilter;
    use crate::domain::types::{UserId, WalletId};
    use async_trait::async_trait;
    use chrono::Utc;
    use mockall::mock;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    mock! {
        pub ReadRepositoryImpl {}

        #[async_trait]
        impl ReadRepository for ReadRepositoryImpl {
            async fn get_balance(&self, user_id: UserId, asset_symbol: &str) -> Result<Decimal, ReadError>;
            async fn get_ledger(&self, user_id: UserId, asset_symbol: Option<String>, limit: i64, offset: i64) -> Result<(Vec<LedgerEntry>, i64), ReadError>;
            async fn get_transaction_history(&self, user_id: UserId, filter: HistoryFilter) -> Result<(Vec<Transaction>, i64), ReadError>;
            async fn get_transaction_by_id(&self, tx_id: TransactionId) -> Result<(Transaction, Vec<LedgerEntry>), ReadError>;
        }
    }

    #[tokio::test]
    async fn round_trips_a_committed_transfer() {
        let tx_id = TransactionId::new();
        let from = WalletId::new();
        let to = WalletId::new();

        let mut repo = MockReadRepositoryImpl::new();
        repo.expect_get_transaction_by_id().times(1).returning(move |_| {
            let tx = Transaction::reconstitute(
                tx_id,
                "k1".to_string(),
                from,
                to,
                dec!(100),
                TransactionType::TopUp,
                TransactionStatus::Success,
                Utc::now(),
            )
            .unwrap();
            let entries = vec![
                LedgerEntry::reconstitute(
                    uuid::Uuid::new_v4(),
                    tx_id,
                    from,
                    EntryType::Debit,
                    dec!(100),
                    dec!(999_999_900),
                    Utc::now(),
                )
                .unwrap(),
                LedgerEntry::reconstitute(
                    uuid::Uuid::new_v4(),
                    tx_id,
                    to,
                    EntryType::Credit,
                    dec!(100),
                    dec!(600),
                    Utc::now(),
                )
                .unwrap(),
            ];
            Ok((tx, entries))
        });

        let use_case = GetTransactionByIdUseCase::new(Arc::new(repo));
        let (tx, entries) = use_case.execute(tx_id).await.unwrap();

        assert_eq!(tx.id(), tx_id);
        assert_eq!(entries.len(), 2);
        let debit_total: Decimal = entries
            .iter()
            .filter(|e| e.entry_type() == EntryType::Debit)
            .map(|e| e.amount())
            .sum();
        let credit_total: Decimal = entries
            .iter()
            .filter(|e| e.entry_type() == EntryType::Credit)
            .map(|e| e.amount())
            .sum();
        assert_eq!(debit_total, tx.amount());
        assert_eq!(credit_total, tx.amount());
    }
}
