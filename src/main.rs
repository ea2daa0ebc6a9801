use std::sync::Arc;

use anyhow::Context;
use redis::aio::ConnectionManager;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use wallet_ledger_service::api::{
    http_routes::{routes, AppState},
    response::ApiResponse,
};
use wallet_ledger_service::config::AppConfig;
use wallet_ledger_service::domain::repository::UserDirectory;
use wallet_ledger_service::infrastructure::cache::RedisIdempotencyCache;
use wallet_ledger_service::infrastructure::persistence::{
    PostgresReadRepository, PostgresTransferRepository, PostgresUserDirectory,
};
use wallet_ledger_service::use_cases::{
    execute_transfer::ExecuteTransferUseCase, get_balance::GetBalanceUseCase,
    get_ledger::GetLedgerUseCase, get_transaction_by_id::GetTransactionByIdUseCase,
    get_transaction_history::GetTransactionHistoryUseCase, router::RequestRouter,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        wallet_ledger_service::api::http_routes::execute_transfer,
        wallet_ledger_service::api::http_routes::get_balance,
        wallet_ledger_service::api::http_routes::get_ledger,
        wallet_ledger_service::api::http_routes::get_transaction_history,
        wallet_ledger_service::api::http_routes::get_transaction_by_id
    ),
    components(schemas(
        wallet_ledger_service::api::http_routes::ExecuteTransferBody,
        wallet_ledger_service::api::response::TransferResponse,
        ApiResponse<serde_json::Value>
    ))
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load environment variables.
    dotenvy::dotenv().ok();

    // 2. Configuration, assembled once and passed down explicitly — no
    // process-global singletons (spec.md §9).
    let config = AppConfig::from_env()?;

    // 3. Logging/tracing, driven by LOG_LEVEL.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("starting wallet ledger service");

    // 4. Database connection pool and migrations.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("failed to connect to DATABASE_URL")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    info!("connected to database and applied migrations");

    // 5. Fast Idempotency Cache connection.
    let redis_client = redis::Client::open(config.fic_url.clone()).context("invalid FIC_URL")?;
    let redis_conn = ConnectionManager::new(redis_client)
        .await
        .context("failed to connect to FIC")?;

    // 6. Resolve the Treasury user id once, at boot (spec.md §4.3). The
    // service refuses to start if the well-known Treasury account is
    // missing — see RequestRouter's doc comment for the staleness
    // trade-off this implies for the lifetime of the process.
    let user_directory = PostgresUserDirectory::new(pool.clone());
    let treasury_id = user_directory
        .find_user_id_by_email(&config.treasury_email)
        .await
        .context("failed to query for the treasury user")?
        .with_context(|| {
            format!(
                "treasury user with email '{}' not found; refusing to start",
                config.treasury_email
            )
        })?;
    let router = RequestRouter::new(treasury_id);

    info!(treasury_id = %treasury_id, "resolved treasury account");

    // 7. Wire repositories, caches, and use cases.
    let transfer_repo = Arc::new(PostgresTransferRepository::new(pool.clone(), config.lock_timeout));
    let read_repo = Arc::new(PostgresReadRepository::new(pool.clone()));
    let idempotency_cache = Arc::new(RedisIdempotencyCache::new(
        redis_conn,
        config.idempotency_processing_ttl,
        config.idempotency_terminal_ttl,
    ));

    let execute_transfer = ExecuteTransferUseCase::new(
        router,
        idempotency_cache,
        transfer_repo,
        config.max_amount,
    );
    let get_balance = GetBalanceUseCase::new(read_repo.clone());
    let get_ledger = GetLedgerUseCase::new(read_repo.clone());
    let get_transaction_history = GetTransactionHistoryUseCase::new(read_repo.clone());
    let get_transaction_by_id = GetTransactionByIdUseCase::new(read_repo);

    let app_state = Arc::new(AppState {
        execute_transfer,
        get_balance,
        get_ledger,
        get_transaction_history,
        get_transaction_by_id,
    });

    // 8. Routes and HTTP server.
    let app = routes(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "HTTP server listening");
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
