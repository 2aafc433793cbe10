use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};
use crate::db::StoreError;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, full_name, is_active, created_at, updated_at, deleted_at";

/// Persistence operations the credential flows need.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Find a non-deleted user by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Count non-deleted users holding either the username or the email.
    async fn count_with_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<i64, StoreError>;
    /// Insert a new user; a taken username/email surfaces as `UniqueViolation`.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn count_with_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE (username = $1 OR email = $2) AND deleted_at IS NULL
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_one(&self.db)
        .await?;
        Ok(count)
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, username, email, password_hash, full_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .fetch_one(&self.db)
        .await?;
        Ok(created)
    }
}
