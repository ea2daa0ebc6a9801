use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::error::TransferError;
use crate::domain::types::TransactionId;

/// The value stored under `idempotency:<key>` in the Fast Idempotency
/// Cache (spec.md §6). `Processing` is written with a short TTL by
/// `reserve_or_fetch`; `Finalize` overwrites it with a terminal variant
/// and a long TTL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum CachedOutcome {
    #[serde(rename = "PROCESSING")]
    Processing,
    #[serde(rename = "SUCCESS")]
    Success { tx_id: TransactionId, balance: String },
    #[serde(rename = "FAILED")]
    Failed { error: String, message: String },
}

/// Result of `IdempotencyCache::reserve_or_fetch`.
#[derive(Debug, Clone)]
pub enum ReservationOutcome {
    /// No prior attempt was found; the key is now reserved under this
    /// caller's name and must be finalized.
    Reserved,
    /// Another caller holds the reservation and has not finalized yet.
    InFlight,
    /// A prior attempt already finalized; return this outcome verbatim.
    Terminal(CachedOutcome),
}

/// Port for the Idempotency Coordinator (spec.md §4.2). Not a lock: the
/// PS-level `UNIQUE(idempotency_key)` constraint is the source of truth,
/// this cache only saves a round trip and collapses concurrent retries
/// of the exact same key into a single in-flight attempt.
#[async_trait]
pub trait IdempotencyCache: Send + Sync {
    async fn reserve_or_fetch(&self, key: &str) -> Result<ReservationOutcome, TransferError>;

    async fn finalize(&self, key: &str, outcome: CachedOutcome) -> Result<(), TransferError>;
}
