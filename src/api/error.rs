use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::error::{ReadError, TransferError};

/// Unified HTTP-boundary error. The core never constructs this; it only
/// ever sees `TransferError`/`ReadError` (spec.md §9: the envelope lives
/// at the adapter, not in the engine).
pub enum ApiError {
    Transfer(TransferError),
    Read(ReadError),
    BadRequest(String),
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        ApiError::Transfer(err)
    }
}

impl From<ReadError> for ApiError {
    fn from(err: ReadError) -> Self {
        ApiError::Read(err)
    }
}

/// Maps `TransferError::code()` back to a status for a replayed
/// `CachedFailure` — the original failure's status without re-deriving
/// it from a free-form message.
fn status_for_code(code: &str) -> StatusCode {
    match code {
        "VALIDATION" | "WALLET_NOT_FOUND" | "UNKNOWN_ASSET" | "INSUFFICIENT_FUNDS" => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Transfer(e) => match e {
                TransferError::Validation(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                TransferError::WalletNotFound(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                TransferError::UnknownAsset(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                TransferError::InsufficientFunds(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                TransferError::InFlight => (StatusCode::CONFLICT, e.to_string()),
                TransferError::Contention(ref msg) => {
                    tracing::error!(error = %msg, "transfer exhausted retry budget");
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
                }
                TransferError::Corruption { wallet, ref observed } => {
                    tracing::error!(%wallet, %observed, "invariant violation surfaced to caller");
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
                }
                TransferError::Infrastructure(ref msg) => {
                    tracing::error!(error = %msg, "infrastructure error");
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
                }
                TransferError::CachedFailure { ref code, ref message } => {
                    (status_for_code(code), message.clone())
                }
            },
            ApiError::Read(e) => match e {
                ReadError::UserNotFound => (StatusCode::NOT_FOUND, e.to_string()),
                ReadError::UnknownAsset(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                ReadError::WalletNotFound => (StatusCode::NOT_FOUND, e.to_string()),
                ReadError::TransactionNotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
                ReadError::InvalidPagination(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                ReadError::Infrastructure(ref msg) => {
                    tracing::error!(error = %msg, "infrastructure error");
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
                }
            },
        };

        let body = Json(json!({
            "status": "error",
            "error": message,
        }));

        (status, body).into_response()
    }
}
