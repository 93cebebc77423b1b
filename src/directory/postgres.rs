use super::{DirectoryError, User, UserDirectory};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    Connection, PgPool, Row,
};
use std::time::Duration;
use tracing::{debug, info_span, instrument, Instrument};
use uuid::Uuid;

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

/// PostgreSQL backed directory; uniqueness comes from the `users.email` constraint.
#[derive(Debug, Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `dsn` and make sure the `users` table exists.
    ///
    /// # Errors
    /// Returns an error if the connection or the schema statement fails.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await
            .context("Failed to connect to database")?;

        let directory = Self::new(pool);
        directory.apply_schema().await?;

        Ok(directory)
    }

    /// Idempotent; every statement in the schema uses `IF NOT EXISTS`.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be applied.
    pub async fn apply_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(&self.pool)
            .await
            .context("Failed to apply database schema")?;

        debug!("database schema applied");

        Ok(())
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        credential: row.try_get("credential")?,
    })
}

#[async_trait]
impl UserDirectory for PgDirectory {
    #[instrument(skip(self))]
    async fn find(&self, email: &str) -> Result<Vec<User>, DirectoryError> {
        let query = "SELECT id, email, credential FROM users WHERE email = $1";

        let rows = sqlx::query(query)
            .bind(email)
            .fetch_all(&self.pool)
            .instrument(info_span!(
                "db.query",
                db.system = "postgresql",
                db.operation = "SELECT"
            ))
            .await?;

        rows.iter()
            .map(user_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(DirectoryError::from)
    }

    #[instrument(skip(self, credential))]
    async fn create(&self, email: &str, credential: &str) -> Result<User, DirectoryError> {
        let query = r"
            INSERT INTO users (id, email, credential)
            VALUES ($1, $2, $3)
            RETURNING id, email, credential
        ";

        let result = sqlx::query(query)
            .bind(Uuid::now_v7())
            .bind(email)
            .bind(credential)
            .fetch_one(&self.pool)
            .instrument(info_span!(
                "db.query",
                db.system = "postgresql",
                db.operation = "INSERT"
            ))
            .await;

        match result {
            Ok(row) => Ok(user_from_row(&row)?),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                debug!("email already registered");

                Err(DirectoryError::EmailTaken)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn ping(&self) -> Result<(), DirectoryError> {
        let mut conn = self
            .pool
            .acquire()
            .instrument(info_span!(
                "db.acquire",
                db.system = "postgresql",
                db.operation = "ACQUIRE"
            ))
            .await?;

        conn.ping()
            .instrument(info_span!(
                "db.ping",
                db.system = "postgresql",
                db.operation = "PING"
            ))
            .await?;

        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
