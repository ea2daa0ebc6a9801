use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::repository::UserDirectory;
use crate::domain::types::UserId;

/// Resolves the well-known Treasury account at boot (spec.md §4.3). Not
/// used anywhere else — the Request Router holds the resolved id for
/// the lifetime of the process.
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_user_id_by_email(&self, email: &str) -> anyhow::Result<Option<UserId>> {
        let id = sqlx::query_scalar::<_, UserId>("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }
}
