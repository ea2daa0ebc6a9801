use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::entities::{Transaction, TransactionType};
use crate::domain::error::ReadError;
use crate::domain::repository::{HistoryFilter, ReadRepository};
use crate::domain::types::UserId;
use crate::use_cases::get_ledger::Page;

/// `GetTransactionHistory` read projection (spec.md §4.4).
///
/// Unlike the source this was distilled from, the asset filter is part
/// of `HistoryFilter` and is pushed all the way into the storage
/// predicate (see `DESIGN.md`, Open Question 2) — `total` always
/// matches the filtered set, so `hasMore` never lies.
#[derive(Clone)]
pub struct GetTransactionHistoryUseCase {
    read_repo: Arc<dyn ReadRepository>,
}

impl GetTransactionHistoryUseCase {
    pub fn new(read_repo: Arc<dyn ReadRepository>) -> Self {
        Self { read_repo }
    }

    #[tracing::instrument(name = "GetTransactionHistoryUseCase::execute", skip(self))]
    #[allow(clippy::too_many_arguments)]
    pub async fn execute(
        &self,
        user_id: UserId,
        transaction_type: Option<TransactionType>,
        asset_symbol: Option<String>,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
        limit: i64,
        offset: i64,
    ) -> Result<Page<Transaction>, ReadError> {
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
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                return Err(ReadError::InvalidPagination(
                    "startDate must not be after endDate".to_string(),
                ));
            }
        }

        let filter = HistoryFilter {
            transaction_type,
            asset_symbol,
            start_date,
            end_date,
            limit,
            offset,
        };

        let (items, total) = self.read_repo.get_transaction_history(user_id, filter).await?;

        Ok(Page {
            items,
            total,
            limit,
            offset,
        })
    }
}
