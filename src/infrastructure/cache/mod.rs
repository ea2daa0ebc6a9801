pub mod redis_idempotency_cache;

pub use redis_idempotency_cache::RedisIdempotencyCache;
