//! Handle database requests.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::error::Result;
use crate::user::{NewUser, User};

/// Port for user persistence operations.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Whether a user already uses this email.
    async fn email_exists(&self, email: &str) -> Result<bool>;

    /// Insert a new user and return its generated `id`.
    ///
    /// Returns `None` if the email is already taken.
    async fn insert(&self, user: &NewUser) -> Result<Option<i32>>;

    /// Find the user matching both `email` and `password`.
    async fn find_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>>;
}

/// PostgreSQL user repository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new [`PgUserRepository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn email_exists(&self, email: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)"#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert(&self, user: &NewUser) -> Result<Option<i32>> {
        // The unique index on `email` settles concurrent registrations.
        let id = sqlx::query_scalar::<_, i32>(
            r#"INSERT INTO users (name, email, password)
                VALUES ($1, $2, $3)
                ON CONFLICT (email) DO NOTHING
                RETURNING id"#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    async fn find_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, name, email, password
                FROM users
                WHERE email = $1 AND password = $2
                LIMIT 1"#,
        )
        .bind(email)
        .bind(password)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
