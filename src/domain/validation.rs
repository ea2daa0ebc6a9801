use rust_decimal::Decimal;

use crate::domain::error::TransferError;
use crate::domain::types::UserId;

/// Shared boundary checks for `ExecuteTransferUseCase` (spec.md §4.1:
/// "Validation: fail fast, no PS work"). Kept free of any repository
/// access so it can run before a connection is ever checked out.
pub fn validate_idempotency_key(key: &str) -> Result<(), TransferError> {
    if key.trim().is_empty() {
        return Err(TransferError::Validation(
            "idempotency key must not be empty".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_amount(amount: Decimal, max_amount: Decimal) -> Result<(), TransferError> {
    if amount <= Decimal::ZERO {
        return Err(TransferError::Validation(
            "amount must be strictly positive".to_string(),
        ));
    }
    if amount > max_amount {
        return Err(TransferError::Validation(format!(
            "amount {amount} exceeds the configured maximum {max_amount}"
        )));
    }
    Ok(())
}

pub fn validate_distinct_users(from: UserId, to: UserId) -> Result<(), TransferError> {
    if from == to {
        return Err(TransferError::Validation(
            "source and destination users must differ".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_asset_symbol(symbol: &str) -> Result<String, TransferError> {
    let normalized = symbol.trim().to_uppercase();
    if normalized.is_empty() {
        return Err(TransferError::Validation(
            "assetSymbol must not be empty".to_string(),
        ));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_zero_and_negative_amounts() {
        assert!(validate_amount(dec!(0), dec!(100)).is_err());
        assert!(validate_amount(dec!(-5), dec!(100)).is_err());
    }

    #[test]
    fn rejects_amount_over_max() {
        assert!(validate_amount(dec!(101), dec!(100)).is_err());
        assert!(validate_amount(dec!(100), dec!(100)).is_ok());
    }

    #[test]
    fn rejects_blank_idempotency_key() {
        assert!(validate_idempotency_key("").is_err());
        assert!(validate_idempotency_key("   ").is_err());
        assert!(validate_idempotency_key("k1").is_ok());
    }

    #[test]
    fn rejects_equal_endpoints() {
        let u = UserId::new();
        assert!(validate_distinct_users(u, u).is_err());
        assert!(validate_distinct_users(u, UserId::new()).is_ok());
    }

    #[test]
    fn normalizes_asset_symbol() {
        assert_eq!(validate_asset_symbol(" gold ").unwrap(), "GOLD");
        assert!(validate_asset_symbol("  ").is_err());
    }
}
