use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;
use wallet_ledger_service::config::AppConfig;

/// Seeds the treasury user, a demo asset, and a couple of demo wallets
/// for local development (spec.md §1: bootstrap/seeding is out of the
/// core's scope but needed to exercise the service end to end). Safe to
/// run more than once: every insert is `ON CONFLICT DO NOTHING` keyed on
/// the same unique constraints the schema already enforces.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database_url)
        .await?;

    let treasury_id = upsert_user(&pool, &config.treasury_email, "Treasury").await?;
    let alice_id = upsert_user(&pool, "alice@example.com", "Alice").await?;
    let bob_id = upsert_user(&pool, "bob@example.com", "Bob").await?;

    let asset_id = upsert_asset(&pool, "GOLD", "Gold").await?;

    upsert_wallet(&pool, treasury_id, asset_id, Decimal::from(1_000_000_000u64)).await?;
    upsert_wallet(&pool, alice_id, asset_id, Decimal::from(500u32)).await?;
    upsert_wallet(&pool, bob_id, asset_id, Decimal::from(1000u32)).await?;

    println!("seeded treasury ({treasury_id}), alice ({alice_id}), bob ({bob_id}), asset GOLD ({asset_id})");
    Ok(())
}

async fn upsert_user(pool: &sqlx::PgPool, email: &str, name: &str) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, email, name) VALUES ($1, $2, $3) ON CONFLICT (email) DO NOTHING",
    )
    .bind(id)
    .bind(email)
    .bind(name)
    .execute(pool)
    .await?;

    let id: Uuid = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

async fn upsert_asset(pool: &sqlx::PgPool, symbol: &str, name: &str) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO assets (id, symbol, name) VALUES ($1, $2, $3) ON CONFLICT (symbol) DO NOTHING",
    )
    .bind(id)
    .bind(symbol)
    .bind(name)
    .execute(pool)
    .await?;

    let id: Uuid = sqlx::query_scalar("SELECT id FROM assets WHERE symbol = $1")
        .bind(symbol)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

async fn upsert_wallet(
    pool: &sqlx::PgPool,
    user_id: Uuid,
    asset_id: Uuid,
    balance: Decimal,
) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO wallets (id, user_id, asset_id, balance) VALUES ($1, $2, $3, $4) \
         ON CONFLICT (user_id, asset_id) DO NOTHING",
    )
    .bind(id)
    .bind(user_id)
    .bind(asset_id)
    .bind(balance)
    .execute(pool)
    .await?;

    let id: Uuid = sqlx::query_scalar("SELECT id FROM wallets WHERE user_id = $1 AND asset_id = $2")
        .bind(user_id)
        .bind(asset_id)
        .fetch_one(pool)
        .await?;
    Ok(id)
}
