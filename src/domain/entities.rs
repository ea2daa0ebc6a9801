use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::error::EntityError;
use crate::domain::types::{AssetId, TransactionId, UserId, WalletId};

/// A platform user. One distinguished user (identified by a well-known
/// email, see `RequestRouter`) is the Treasury.
///
/// # Examples
/// ```
/// use wallet_ledger_service::domain::entities::User;
/// use wallet_ledger_service::domain::types::UserId;
///
/// let user = User::reconstitute(UserId::new(), "jane@example.com".to_string(), "Jane".to_string());
/// assert!(user.is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: String,
    name: String,
}

impl User {
    /// Reconstructs a `User` loaded from persistence. Closed constructor:
    /// catches a corrupt row (blank email/name) rather than silently
    /// exposing it through the API.
    pub fn reconstitute(id: UserId, email: String, name: String) -> Result<Self, EntityError> {
        if email.trim().is_empty() || name.trim().is_empty() {
            return Err(EntityError::InvalidData(
                "user email and name must not be blank".to_string(),
            ));
        }
        Ok(Self { id, email, name })
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A fungible virtual asset (e.g. GOLD, DIAMOND). Symbol is stored
/// upper-case and is immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    id: AssetId,
    symbol: String,
    name: String,
}

impl Asset {
    pub fn normalize_symbol(symbol: &str) -> String {
        symbol.trim().to_uppercase()
    }

    /// Reconstructs an `Asset` loaded from persistence.
    pub fn reconstitute(id: AssetId, symbol: String, name: String) -> Result<Self, EntityError> {
        if symbol.trim().is_empty() || name.trim().is_empty() {
            return Err(EntityError::InvalidData(
                "asset symbol and name must not be blank".to_string(),
            ));
        }
        Ok(Self {
            id,
            symbol: Self::normalize_symbol(&symbol),
            name,
        })
    }

    pub fn id(&self) -> AssetId {
        self.id
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A (user, asset) balance row. `balance` is a cached projection of the
/// ledger: it must always equal the `balance_after` of the wallet's most
/// recent ledger entry.
///
/// # Examples
/// ```
/// use wallet_ledger_service::domain::entities::Wallet;
/// use wallet_ledger_service::domain::types::{AssetId, UserId, WalletId};
/// use rust_decimal::Decimal;
///
/// let wallet = Wallet::reconstitute(WalletId::new(), UserId::new(), AssetId::new(), Decimal::from(500));
/// assert!(wallet.is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    id: WalletId,
    user_id: UserId,
    asset_id: AssetId,
    balance: Decimal,
}

impl Wallet {
    /// Reconstructs a `Wallet` loaded from persistence. The non-negative
    /// balance invariant (spec.md §3) is already enforced by a DB `CHECK`
    /// constraint; this is a second, defense-in-depth check at the
    /// domain boundary.
    pub fn reconstitute(
        id: WalletId,
        user_id: UserId,
        asset_id: AssetId,
        balance: Decimal,
    ) -> Result<Self, EntityError> {
        if balance < Decimal::ZERO {
            return Err(EntityError::InvalidData(format!(
                "wallet balance must not be negative, observed {balance}"
            )));
        }
        Ok(Self {
            id,
            user_id,
            asset_id,
            balance,
        })
    }

    pub fn id(&self) -> WalletId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn asset_id(&self) -> AssetId {
        self.asset_id
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    TopUp,
    Bonus,
    Spend,
}

/// Every transaction this engine ever inserts is `Success` — validation,
/// not-found, and insufficient-funds failures are rejected before a row
/// is written (spec.md §4.1 step 8). The column exists for schema
/// completeness and to leave room for a future reversal workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Success,
}

/// A committed transfer between two wallets of the same asset.
///
/// # Examples
/// ```
/// use wallet_ledger_service::domain::entities::{Transaction, TransactionStatus, TransactionType};
/// use wallet_ledger_service::domain::types::WalletId;
/// use rust_decimal::Decimal;
/// use chrono::Utc;
///
/// let tx = Transaction::reconstitute(
///     Default::default(),
///     "k1".to_string(),
///     WalletId::new(),
///     WalletId::new(),
///     Decimal::from(100),
///     TransactionType::TopUp,
///     TransactionStatus::Success,
///     Utc::now(),
/// );
/// assert!(tx.is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    idempotency_key: String,
    from_wallet: WalletId,
    to_wallet: WalletId,
    amount: Decimal,
    transaction_type: TransactionType,
    status: TransactionStatus,
    created_at: DateTime<Utc>,
}

impl Transaction {
    /// Reconstructs a `Transaction` loaded from persistence, re-checking
    /// the invariants the schema's `CHECK` constraints already enforce
    /// (`amount > 0`, `from_wallet <> to_wallet`, non-blank idempotency
    /// key) as a defense-in-depth boundary around the domain layer.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: TransactionId,
        idempotency_key: String,
        from_wallet: WalletId,
        to_wallet: WalletId,
        amount: Decimal,
        transaction_type: TransactionType,
        status: TransactionStatus,
        created_at: DateTime<Utc>,
    ) -> Result<Self, EntityError> {
        if idempotency_key.trim().is_empty() {
            return Err(EntityError::InvalidData(
                "idempotency key must not be blank".to_string(),
            ));
        }
        if amount <= Decimal::ZERO {
            return Err(EntityError::InvalidData(format!(
                "transaction amount must be positive, observed {amount}"
            )));
        }
        if from_wallet == to_wallet {
            return Err(EntityError::InvalidData(
                "from_wallet and to_wallet must differ".to_string(),
            ));
        }
        Ok(Self {
            id,
            idempotency_key,
            from_wallet,
            to_wallet,
            amount,
            transaction_type,
            status,
            created_at,
        })
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn idempotency_key(&self) -> &str {
        &self.idempotency_key
    }

    pub fn from_wallet(&self) -> WalletId {
        self.from_wallet
    }

    pub fn to_wallet(&self) -> WalletId {
        self.to_wallet
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ledger_entry_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    Debit,
    Credit,
}

/// An immutable ledger line. Exactly two exist per transaction: one
/// `Debit` on the from-wallet, one `Credit` on the to-wallet, both
/// carrying the transaction's amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    id: Uuid,
    transaction_id: TransactionId,
    wallet_id: WalletId,
    entry_type: EntryType,
    amount: Decimal,
    balance_after: Decimal,
    created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Reconstructs a `LedgerEntry` loaded from persistence.
    pub fn reconstitute(
        id: Uuid,
        transaction_id: TransactionId,
        wallet_id: WalletId,
        entry_type: EntryType,
        amount: Decimal,
        balance_after: Decimal,
        created_at: DateTime<Utc>,
    ) -> Result<Self, EntityError> {
        if amount <= Decimal::ZERO {
            return Err(EntityError::InvalidData(format!(
                "ledger entry amount must be positive, observed {amount}"
            )));
        }
        if balance_after < Decimal::ZERO {
            return Err(EntityError::InvalidData(format!(
                "ledger entry balance_after must not be negative, observed {balance_after}"
            )));
        }
        Ok(Self {
            id,
            transaction_id,
            wallet_id,
            entry_type,
            amount,
            balance_after,
            created_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    pub fn wallet_id(&self) -> WalletId {
        self.wallet_id
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn balance_after(&self) -> Decimal {
        self.balance_after
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
