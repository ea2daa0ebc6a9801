pub mod models;
pub mod pg_errors;
pub mod postgres_read_repository;
pub mod postgres_transfer_repository;
pub mod postgres_user_directory;

pub use postgres_read_repository::PostgresReadRepository;
pub use postgres_transfer_repository::PostgresTransferRepository;
pub use postgres_user_directory::PostgresUserDirectory;
