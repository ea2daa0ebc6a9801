pub mod execute_transfer;
pub mod get_balance;
pub mod get_ledger;
pub mod get_transaction_by_id;
pub mod get_transaction_history;
pub mod router;
