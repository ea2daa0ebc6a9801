pub mod entities;
pub mod error;
pub mod idempotency;
pub mod repository;
pub mod transfer;
pub mod types;
pub mod validation;
