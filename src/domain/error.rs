use thiserror::Error;

use crate::domain::types::{TransactionId, WalletId};

/// Failure taxonomy for the Transfer Engine (spec.md §7). Kinds, not
/// exception subclasses: the HTTP boundary maps each variant to a status
/// code once, in `api::error`.
#[derive(Error, Debug)]
pub enum TransferError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("wallet not found: {0}")]
    WalletNotFound(String),

    #[error("unknown asset: {0}")]
    UnknownAsset(String),

    #[error("insufficient funds in wallet {0}")]
    InsufficientFunds(WalletId),

    #[error("a request with this idempotency key is already being processed")]
    InFlight,

    #[error("transfer could not acquire locks after retrying: {0}")]
    Contention(String),

    #[error("invariant violated on wallet {wallet}: observed balance {observed}")]
    Corruption { wallet: WalletId, observed: String },

    #[error("storage error: {0}")]
    Infrastructure(String),

    /// Reconstructed from a terminal `FAILED` entry in the Idempotency
    /// Coordinator's cache (spec.md §4.2: "returns that Terminal outcome
    /// verbatim"). `code` is one of the other variants' `code()` values.
    #[error("{message}")]
    CachedFailure { code: String, message: String },
}

impl TransferError {
    /// Stable short code persisted alongside a cached `FAILED` outcome
    /// so a later replay can reconstruct the right status code without
    /// re-deriving it from the (free-form) message.
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::Validation(_) => "VALIDATION",
            TransferError::WalletNotFound(_) => "WALLET_NOT_FOUND",
            TransferError::UnknownAsset(_) => "UNKNOWN_ASSET",
            TransferError::InsufficientFunds(_) => "INSUFFICIENT_FUNDS",
            TransferError::InFlight => "IN_FLIGHT",
            TransferError::Contention(_) => "CONTENTION",
            TransferError::Corruption { .. } => "CORRUPTION",
            TransferError::Infrastructure(_) => "INFRASTRUCTURE",
            TransferError::CachedFailure { .. } => "CACHED_FAILURE",
        }
    }

    /// True for terminal, cacheable outcomes (spec.md §7: Validation,
    /// NotFound and InsufficientFunds are "Terminal; cached in FIC as
    /// FAILED"). Conflict/InFlight and Contention-after-retry are not
    /// cached by the caller.
    pub fn is_cacheable_failure(&self) -> bool {
        matches!(
            self,
            TransferError::Validation(_)
                | TransferError::WalletNotFound(_)
                | TransferError::UnknownAsset(_)
                | TransferError::InsufficientFunds(_)
        )
    }
}

/// Raised by an entity's `reconstitute` constructor when a row loaded
/// from persistence violates an invariant the schema's `CHECK`
/// constraints should already have prevented.
#[derive(Error, Debug)]
pub enum EntityError {
    #[error("invalid entity data: {0}")]
    InvalidData(String),
}

/// Failure taxonomy for the Read Projections.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("user not found")]
    UserNotFound,

    #[error("unknown asset: {0}")]
    UnknownAsset(String),

    #[error("wallet not found for this user/asset pair")]
    WalletNotFound,

    #[error("transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    #[error("invalid pagination parameters: {0}")]
    InvalidPagination(String),

    #[error("storage error: {0}")]
    Infrastructure(String),
}

impl From<EntityError> for ReadError {
    fn from(e: EntityError) -> Self {
        ReadError::Infrastructure(format!("corrupt row: {e}"))
    }
}
