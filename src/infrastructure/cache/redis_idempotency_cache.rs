use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};

use crate::domain::error::TransferError;
use crate::domain::idempotency::{CachedOutcome, IdempotencyCache, ReservationOutcome};

/// Redis-backed Fast Idempotency Cache (spec.md §4.2, §6). Optimistic:
/// the PS-level `UNIQUE(idempotency_key)` constraint is what actually
/// prevents a duplicate transfer, this just saves the round trip and
/// collapses concurrent retries of the same key into one in-flight
/// attempt.
pub struct RedisIdempotencyCache {
    conn: ConnectionManager,
    processing_ttl: Duration,
    terminal_ttl: Duration,
}

impl RedisIdempotencyCache {
    pub fn new(conn: ConnectionManager, processing_ttl: Duration, terminal_ttl: Duration) -> Self {
        Self {
            conn,
            processing_ttl,
            terminal_ttl,
        }
    }

    fn cache_key(key: &str) -> String {
        format!("idempotency:{key}")
    }
}

#[async_trait]
impl IdempotencyCache for RedisIdempotencyCache {
    #[tracing::instrument(skip(self))]
    async fn reserve_or_fetch(&self, key: &str) -> Result<ReservationOutcome, TransferError> {
        let cache_key = Self::cache_key(key);
        let payload = serde_json::to_string(&CachedOutcome::Processing)
            .map_err(|e| TransferError::Infrastructure(e.to_string()))?;

        let mut conn = self.conn.clone();
        let reserved: Option<String> = redis::cmd("SET")
            .arg(&cache_key)
            .arg(&payload)
            .arg("NX")
            .arg("PX")
            .arg(self.processing_ttl.as_millis() as u64)
            .query_async(&mut conn)
            .await
            .map_err(|e| TransferError::Infrastructure(e.to_string()))?;

        if reserved.is_some() {
            return Ok(ReservationOutcome::Reserved);
        }

        let existing: Option<String> = conn
            .get(&cache_key)
            .await
            .map_err(|e| TransferError::Infrastructure(e.to_string()))?;

        let Some(existing) = existing else {
            // The reservation we lost the race for expired between our
            // failed SET NX and this GET. Treat it as if we'd reserved
            // it ourselves rather than looping.
            return Ok(ReservationOutcome::Reserved);
        };

        let outcome: CachedOutcome = serde_json::from_str(&existing)
            .map_err(|e| TransferError::Infrastructure(e.to_string()))?;

        Ok(match outcome {
            CachedOutcome::Processing => ReservationOutcome::InFlight,
            terminal => ReservationOutcome::Terminal(terminal),
        })
    }

    #[tracing::instrument(skip(self, outcome))]
    async fn finalize(&self, key: &str, outcome: CachedOutcome) -> Result<(), TransferError> {
        let cache_key = Self::cache_key(key);
        let payload = serde_json::to_string(&outcome)
            .map_err(|e| TransferError::Infrastructure(e.to_string()))?;

        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(&cache_key, payload, self.terminal_ttl.as_secs())
            .await
            .map_err(|e| TransferError::Infrastructure(e.to_string()))?;

        Ok(())
    }
}
