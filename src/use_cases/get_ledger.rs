use std::sync::Arc;

use crate::domain::entities::LedgerEntry;
use crate::domain::error::ReadError;
use crate::domain::repository::ReadRepository;
use crate::domain::types::UserId;

/// A single page of results plus the bookkeeping needed to compute
/// `hasMore` (spec.md §4.4: `hasMore = offset + returned < total`).
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.offset + (self.items.len() as i64) < self.total
    }
}

/// `GetLedger` read projection (spec.md §4.4).
#[derive(Clone)]
pub struct GetLedgerUseCase {
    read_repo: Arc<dyn ReadRepository>,
}

impl GetLedgerUseCase {
    pub fn new(read_repo: Arc<dyn ReadRepository>) -> Self {
        Self { read_repo }
    }

    #[tracing::instrument(name = "GetLedgerUseCase::execute", skip(self))]
    pub async fn execute(
        &self,
        user_id: UserId,
        asset_symbol: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Page<LedgerEntry>, ReadError> {
        if !(1..=500).contains(&limit) {
            return Err(ReadError::InvalidPagination(
                "limit must be between 1 and 500".to_string(),
            ));
        }
        if offset < 0 {
            return Err(ReadError::InvalidPagination(
                "offset must be non-negative".to_string(),
            ));
        }

        let (items, total) = self
            .read_repo
            .get_ledger(user_id, asset_symbol.map(str::to_string), limit, offset)
            .await?;

        Ok(Page {
            items,
            total,
            limit,
            offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Transaction;
    use crate::domain::repository::HistoryFilter;
    use crate::domain::types::TransactionId;
    use async_trait::async_trait;
    use mockall::mock;
    use rust_decimal::Decimal;

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
    async fn rejects_out_of_range_limit() {
        let repo = MockReadRepositoryImpl::new();
        let use_case = GetLedgerUseCase::new(Arc::new(repo));

        assert!(use_case.execute(UserId::new(), None, 0, 0).await.is_err());
        assert!(use_case.execute(UserId::new(), None, 501, 0).await.is_err());
    }

    #[tokio::test]
    async fn rejects_negative_offset() {
        let repo = MockReadRepositoryImpl::new();
        let use_case = GetLedgerUseCase::new(Arc::new(repo));

        assert!(use_case.execute(UserId::new(), None, 10, -1).await.is_err());
    }

    #[tokio::test]
    async fn has_more_reflects_total_minus_window() {
        let mut repo = MockReadRepositoryImpl::new();
        repo.expect_get_ledger()
            .times(1)
            .returning(|_, _, _, _| Ok((vec![], 12)));

        let use_case = GetLedgerUseCase::new(Arc::new(repo));
        let page = use_case.execute(UserId::new(), None, 10, 0).await.unwrap();

        assert_eq!(page.total, 12);
        assert!(page.has_more());
    }
}
