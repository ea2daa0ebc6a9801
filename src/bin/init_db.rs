use sqlx::postgres::PgPoolOptions;
use wallet_ledger_service::config::AppConfig;

/// Runs pending migrations against `DIRECT_URL` (falling back to
/// `DATABASE_URL`) — the non-pooled connection string spec.md §6 names
/// for this kind of one-shot administrative work.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let url = config.direct_url.as_deref().unwrap_or(&config.database_url);

    println!("connecting to {url}...");
    let pool = PgPoolOptions::new().max_connections(2).connect(url).await?;

    println!("running migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    println!("database initialized");
    Ok(())
}
