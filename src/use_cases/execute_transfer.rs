use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::warn;

use crate::domain::entities::TransactionType;
use crate::domain::error::TransferError;
use crate::domain::idempotency::{CachedOutcome, IdempotencyCache, ReservationOutcome};
use crate::domain::repository::TransferRepository;
use crate::domain::transfer::{TransferOutcome, TransferRequest};
use crate::domain::types::UserId;
use crate::domain::validation::{
    validate_amount, validate_asset_symbol, validate_distinct_users, validate_idempotency_key,
};
use crate::use_cases::router::RequestRouter;

/// Orchestrates the Request Router, the Idempotency Coordinator, and the
/// Transfer Engine for a single `POST /wallets/transactions` call
/// (spec.md §2 control flow).
#[derive(Clone)]
pub struct ExecuteTransferUseCase {
    router: RequestRouter,
    idempotency: Arc<dyn IdempotencyCache>,
    transfer_repo: Arc<dyn TransferRepository>,
    max_amount: Decimal,
}

impl ExecuteTransferUseCase {
    pub fn new(
        router: RequestRouter,
        idempotency: Arc<dyn IdempotencyCache>,
        transfer_repo: Arc<dyn TransferRepository>,
        max_amount: Decimal,
    ) -> Self {
        Self {
            router,
            idempotency,
            transfer_repo,
            max_amount,
        }
    }

    #[tracing::instrument(name = "ExecuteTransferUseCase::execute", skip(self), fields(idempotency_key = %idempotency_key))]
    pub async fn execute(
        &self,
        idempotency_key: String,
        user_id: UserId,
        transaction_type: TransactionType,
        amount: Decimal,
        asset_symbol: String,
    ) -> Result<(TransferOutcome, bool), TransferError> {
        validate_idempotency_key(&idempotency_key)?;
        validate_amount(amount, self.max_amount)?;
        let asset_symbol = validate_asset_symbol(&asset_symbol)?;

        let (from_user, to_user) = self.router.resolve(user_id, transaction_type);
        validate_distinct_users(from_user, to_user)?;

        match self.idempotency.reserve_or_fetch(&idempotency_key).await {
            Ok(ReservationOutcome::Terminal(CachedOutcome::Success { tx_id, balance })) => {
                let user_balance = balance.parse::<Decimal>().map_err(|e| {
                    TransferError::Infrastructure(format!(
                        "corrupt cached balance '{balance}': {e}"
                    ))
                })?;
                return Ok((
                    TransferOutcome {
                        tx_id,
                        user_balance,
                        replay: true,
                    },
                    true,
                ));
            }
            Ok(ReservationOutcome::Terminal(CachedOutcome::Failed { error, message })) => {
                return Err(TransferError::CachedFailure {
                    code: error,
                    message,
                });
            }
            Ok(ReservationOutcome::Terminal(CachedOutcome::Processing)) => {
                // reserve_or_fetch never returns a bare Processing as a
                // Terminal outcome; treat defensively as in-flight.
                return Err(TransferError::InFlight);
            }
            Ok(ReservationOutcome::InFlight) => return Err(TransferError::InFlight),
            Ok(ReservationOutcome::Reserved) => {}
            Err(e) => {
                // FIC outage degrades to PS-only idempotency (spec.md
                // §4.2): fall through to the Transfer Engine, which has
                // its own durable dedup backstop.
                warn!(error = %e, "idempotency cache unavailable, falling back to PS-level dedup");
            }
        }

        let request = TransferRequest {
            idempotency_key: idempotency_key.clone(),
            from_user,
            to_user,
            asset_symbol,
            amount,
            max_amount: self.max_amount,
            transaction_type,
        };

        let result = self.transfer_repo.execute_transfer(request).await;

        match &result {
            Ok(outcome) => {
                let cached = CachedOutcome::Success {
                    tx_id: outcome.tx_id,
                    balance: outcome.user_balance.to_string(),
                };
                if let Err(e) = self.idempotency.finalize(&idempotency_key, cached).await {
                    warn!(error = %e, "failed to write terminal outcome to idempotency cache");
                }
                Ok((outcome.clone(), outcome.replay))
            }
            Err(e) if e.is_cacheable_failure() => {
                let cached = CachedOutcome::Failed {
                    error: e.code().to_string(),
                    message: e.to_string(),
                };
                if let Err(finalize_err) = self.idempotency.finalize(&idempotency_key, cached).await {
                    warn!(error = %finalize_err, "failed to write terminal failure to idempotency cache");
                }
                result.map(|o| (o, false))
            }
            Err(_) => result.map(|o| (o, false)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::TransactionId;
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::*;
    use rust_decimal_macros::dec;

    mock! {
        pub IdempotencyCacheImpl {}

        #[async_trait]
        impl IdempotencyCache for IdempotencyCacheImpl {
            async fn reserve_or_fetch(&self, key: &str) -> Result<ReservationOutcome, TransferError>;
            async fn finalize(&self, key: &str, outcome: CachedOutcome) -> Result<(), TransferError>;
        }
    }

    mock! {
        pub TransferRepositoryImpl {}

        #[async_trait]
        impl TransferRepository for TransferRepositoryImpl {
            async fn execute_transfer(&self, request: TransferRequest) -> Result<TransferOutcome, TransferError>;
        }
    }

    fn router() -> RequestRouter {
        RequestRouter::new(UserId::new())
    }

    #[tokio::test]
    async fn rejects_non_positive_amount_before_touching_cache_or_repo() {
        let idempotency = MockIdempotencyCacheImpl::new();
        let repo = MockTransferRepositoryImpl::new();

        let use_case = ExecuteTransferUseCase::new(
            router(),
            Arc::new(idempotency),
            Arc::new(repo),
            dec!(1_000_000_000),
        );

        let err = use_case
            .execute(
                "k1".to_string(),
                UserId::new(),
                TransactionType::TopUp,
                dec!(0),
                "GOLD".to_string(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::Validation(_)));
    }

    #[tokio::test]
    async fn in_flight_reservation_is_surfaced_as_conflict() {
        let mut idempotency = MockIdempotencyCacheImpl::new();
        idempotency
            .expect_reserve_or_fetch()
            .with(eq("k1"))
            .times(1)
            .returning(|_| Ok(ReservationOutcome::InFlight));
        let repo = MockTransferRepositoryImpl::new();

        let use_case = ExecuteTransferUseCase::new(
            router(),
            Arc::new(idempotency),
            Arc::new(repo),
            dec!(1_000_000_000),
        );

        let err = use_case
            .execute(
                "k1".to_string(),
                UserId::new(),
                TransactionType::TopUp,
                dec!(100),
                "GOLD".to_string(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::InFlight));
    }

    #[tokio::test]
    async fn terminal_success_short_circuits_the_transfer_repository() {
        let mut idempotency = MockIdempotencyCacheImpl::new();
        let tx_id = TransactionId::new();
        idempotency.expect_reserve_or_fetch().times(1).returning(move |_| {
            Ok(ReservationOutcome::Terminal(CachedOutcome::Success {
                tx_id,
                balance: "600.0000".to_string(),
            }))
        });
        let repo = MockTransferRepositoryImpl::new(); // no expectations: must not be called

        let use_case = ExecuteTransferUseCase::new(
            router(),
            Arc::new(idempotency),
            Arc::new(repo),
            dec!(1_000_000_000),
        );

        let (outcome, cached) = use_case
            .execute(
                "k1".to_string(),
                UserId::new(),
                TransactionType::TopUp,
                dec!(100),
                "GOLD".to_string(),
            )
            .await
            .unwrap();

        assert!(cached);
        assert_eq!(outcome.tx_id, tx_id);
        assert_eq!(outcome.user_balance, dec!(600.0000));
    }

    #[tokio::test]
    async fn successful_transfer_finalizes_the_cache() {
        let mut idempotency = MockIdempotencyCacheImpl::new();
        idempotency
            .expect_reserve_or_fetch()
            .times(1)
            .returning(|_| Ok(ReservationOutcome::Reserved));
        idempotency
            .expect_finalize()
            .withf(|_, outcome| matches!(outcome, CachedOutcome::Success { .. }))
            .times(1)
            .returning(|_, _| Ok(()));

        let tx_id = TransactionId::new();
        let mut repo = MockTransferRepositoryImpl::new();
        repo.expect_execute_transfer().times(1).returning(move |_| {
            Ok(TransferOutcome {
                tx_id,
                user_balance: dec!(600.0000),
                replay: false,
            })
        });

        let use_case = ExecuteTransferUseCase::new(
            router(),
            Arc::new(idempotency),
            Arc::new(repo),
            dec!(1_000_000_000),
        );

        let (outcome, cached) = use_case
            .execute(
                "k1".to_string(),
                UserId::new(),
                TransactionType::TopUp,
                dec!(100),
                "gold".to_string(),
            )
            .await
            .unwrap();

        assert!(!cached);
        assert_eq!(outcome.tx_id, tx_id);
    }

    #[tokio::test]
    async fn insufficient_funds_is_cached_as_a_terminal_failure() {
        let mut idempotency = MockIdempotencyCacheImpl::new();
        idempotency
            .expect_reserve_or_fetch()
            .times(1)
            .returning(|_| Ok(ReservationOutcome::Reserved));
        idempotency
            .expect_finalize()
            .withf(|_, outcome| matches!(outcome, CachedOutcome::Failed { .. }))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut repo = MockTransferRepositoryImpl::new();
        let wallet_id = crate::domain::types::WalletId::new();
        repo.expect_execute_transfer()
            .times(1)
            .returning(move |_| Err(TransferError::InsufficientFunds(wallet_id)));

        let use_case = ExecuteTransferUseCase::new(
            router(),
            Arc::new(idempotency),
            Arc::new(repo),
            dec!(1_000_000_000),
        );

        let err = use_case
            .execute(
                "k2".to_string(),
                UserId::new(),
                TransactionType::Spend,
                dec!(10_000),
                "GOLD".to_string(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, TransferError::InsufficientFunds(_)));
    }
}
