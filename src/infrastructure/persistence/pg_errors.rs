use sqlx::Error as SqlxError;

/// Abstracts the store as a capability with explicit predicates instead
/// of callers pattern-matching on string-typed Postgres error codes
/// (spec.md §9, Design Notes). SQLSTATE reference:
/// `40001` serialization_failure, `40P01` deadlock_detected,
/// `55P03` lock_not_available (our `SET LOCAL lock_timeout` trips this).
pub fn is_contention(err: &SqlxError) -> bool {
    let Some(db_err) = err.as_database_error() else {
        return false;
    };
    matches!(db_err.code().as_deref(), Some("40001" | "40P01" | "55P03"))
}

/// SQLSTATE `23505` unique_violation, optionally scoped to a specific
/// constraint name.
pub fn is_unique_violation(err: &SqlxError, constraint: &str) -> bool {
    let Some(db_err) = err.as_database_error() else {
        return false;
    };
    db_err.code().as_deref() == Some("23505")
        && db_err
            .constraint()
            .map(|c| c == constraint)
            .unwrap_or(false)
}
