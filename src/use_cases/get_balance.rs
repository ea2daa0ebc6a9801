use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::error::ReadError;
use crate::domain::repository::ReadRepository;
use crate::domain::types::UserId;

/// `GetBalance` read projection (spec.md §4.4).
#[derive(Clone)]
pub struct GetBalanceUseCase {
    read_repo: Arc<dyn ReadRepository>,
}

impl GetBalanceUseCase {
    pub fn new(read_repo: Arc<dyn ReadRepository>) -> Self {
        Self { read_repo }
    }

    #[tracing::instrument(name = "GetBalanceUseCase::execute", skip(self))]
    pub async fn execute(&self, user_id: UserId, asset_symbol: &str) -> Result<Decimal, ReadError> {
        let balance = self.read_repo.get_balance(user_id, asset_symbol).await?;
        if balance < Decimal::ZERO {
            tracing::error!(%user_id, asset_symbol, %balance, "observed negative wallet balance");
        }
        Ok(balance)
    }
}
