use rust_decimal::Decimal;

use crate::domain::entities::TransactionType;
use crate::domain::types::{TransactionId, UserId};

/// Input to `TransferRepository::execute_transfer`. Already validated at
/// the boundary (amount positive, key non-empty) — see
/// `domain::validation`. `from_user`/`to_user` are resolved by the
/// Request Router before this point.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub idempotency_key: String,
    pub from_user: UserId,
    pub to_user: UserId,
    pub asset_symbol: String,
    pub amount: Decimal,
    pub max_amount: Decimal,
    pub transaction_type: TransactionType,
}

/// Caller-facing result of a transfer attempt, spec.md §4.1.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferOutcome {
    pub tx_id: TransactionId,
    pub user_balance: Decimal,
    /// Set when this outcome was served by the DB-level idempotency
    /// probe (step 2) rather than freshly computed — the durable
    /// backstop for when the Fast Idempotency Cache missed.
    pub replay: bool,
}
