//! database (db) union structure.
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::config::Postgres;

const SCHEMA: &str = include_str!("../schema.sql");

/// Connection pool shared by every request.
#[derive(Clone)]
pub struct Database {
    pub postgres: PgPool,
}

impl Database {
    /// Init database connections.
    ///
    /// One connection is opened right away so an unreachable server
    /// fails here rather than on the first request.
    pub async fn connect(config: &Postgres) -> Result<Self, sqlx::Error> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.database);

        let postgres = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect_with(options)
            .await?;

        tracing::info!(hostname = %config.host, db = %config.database, "postgres connected");

        Ok(Self { postgres })
    }

    /// Create the `users` table if it does not exist yet.
    pub async fn bootstrap(&self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(SCHEMA).execute(&self.postgres).await?;
        Ok(())
    }
}

impl From<PgPool> for Database {
    fn from(postgres: PgPool) -> Self {
        Self { postgres }
    }
}
