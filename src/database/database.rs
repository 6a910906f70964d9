use std::sync::Arc;
use thiserror::Error;
use rusqlite::{self, ffi, ErrorCode};
use tokio_rusqlite::Connection;
use tracing::info;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(tokio_rusqlite::Error),
    #[error("Database connection error: {0}")]
    Connection(String),
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

impl From<tokio_rusqlite::Error> for DatabaseError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        match err {
            tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(code, message))
                if code.code == ErrorCode::ConstraintViolation
                    && matches!(
                        code.extended_code,
                        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    ) =>
            {
                DatabaseError::DuplicateKey(message.unwrap_or_else(|| code.to_string()))
            }
            other => DatabaseError::Sqlite(other),
        }
    }
}

/// Handle to the document store. Cloning shares the single underlying
/// connection thread.
#[derive(Clone)]
pub struct Database {
    pub(crate) conn: Arc<Connection>,
}

impl Database {
    /// Open the store named by a connection string: a file path, or
    /// `:memory:` for a throwaway database.
    pub async fn connect(url: &str) -> Result<Self, DatabaseError> {
        let conn = if url == ":memory:" {
            Connection::open_in_memory().await
        } else {
            Connection::open(url.trim_start_matches("sqlite://")).await
        }
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        let db = Self {
            conn: Arc::new(conn),
        };
        db.initialize().await?;
        info!("Connected to database at {}", url);
        Ok(db)
    }

    async fn initialize(&self) -> Result<(), DatabaseError> {
        self.conn
            .call(|conn| {
                conn.execute_batch(
                    "CREATE TABLE IF NOT EXISTS profiles (
                        id TEXT PRIMARY KEY,
                        email TEXT NOT NULL,
                        body TEXT NOT NULL
                    );
                    CREATE TABLE IF NOT EXISTS allergens (
                        id TEXT PRIMARY KEY,
                        email TEXT NOT NULL,
                        body TEXT NOT NULL
                    );
                    CREATE TABLE IF NOT EXISTS meal_plans (
                        id TEXT PRIMARY KEY,
                        email TEXT NOT NULL,
                        body TEXT NOT NULL
                    );
                    CREATE TABLE IF NOT EXISTS food_logs (
                        id TEXT PRIMARY KEY,
                        email TEXT NOT NULL,
                        dish_name TEXT NOT NULL,
                        calories REAL NOT NULL,
                        protein REAL NOT NULL,
                        carbs REAL NOT NULL,
                        fat REAL NOT NULL,
                        ingredients TEXT NOT NULL,
                        serving_size TEXT NOT NULL,
                        healthiness TEXT NOT NULL,
                        timestamp INTEGER NOT NULL
                    );",
                )?;
                Ok(())
            })
            .await?;

        Ok(())
    }

    /// Must succeed before the service accepts traffic: profile upserts rely
    /// on the unique email index.
    pub async fn ensure_indexes(&self) -> Result<(), DatabaseError> {
        self.conn
            .call(|conn| {
                conn.execute_batch(
                    "CREATE UNIQUE INDEX IF NOT EXISTS profiles_email_unique ON profiles (email);
                    CREATE INDEX IF NOT EXISTS allergens_email ON allergens (email);
                    CREATE INDEX IF NOT EXISTS meal_plans_email ON meal_plans (email);
                    CREATE INDEX IF NOT EXISTS food_logs_email ON food_logs (email, timestamp);",
                )?;
                Ok(())
            })
            .await?;

        info!("Database indexes ensured");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ensure_indexes_is_idempotent() {
        let db = Database::connect(":memory:").await.unwrap();
        db.ensure_indexes().await.unwrap();
        db.ensure_indexes().await.unwrap();
    }

    #[tokio::test]
    async fn unique_index_rejects_existing_duplicates() {
        let db = Database::connect(":memory:").await.unwrap();
        db.conn
            .call(|conn| {
                conn.execute_batch(
                    "INSERT INTO profiles (id, email, body) VALUES ('1', 'a@b.com', '{}');
                    INSERT INTO profiles (id, email, body) VALUES ('2', 'a@b.com', '{}');",
                )?;
                Ok(())
            })
            .await
            .unwrap();

        assert!(db.ensure_indexes().await.is_err());
    }

    #[tokio::test]
    async fn constraint_violation_maps_to_duplicate_key() {
        let db = Database::connect(":memory:").await.unwrap();
        db.ensure_indexes().await.unwrap();

        let result: Result<(), DatabaseError> = db
            .conn
            .call(|conn| {
                conn.execute_batch(
                    "INSERT INTO profiles (id, email, body) VALUES ('1', 'a@b.com', '{}');
                    INSERT INTO profiles (id, email, body) VALUES ('2', 'a@b.com', '{}');",
                )?;
                Ok(())
            })
            .await
            .map_err(DatabaseError::from);

        assert!(matches!(result, Err(DatabaseError::DuplicateKey(_))));
    }

    #[tokio::test]
    async fn other_constraint_failures_stay_generic() {
        let db = Database::connect(":memory:").await.unwrap();
        db.ensure_indexes().await.unwrap();

        let result: Result<(), DatabaseError> = db
            .conn
            .call(|conn| {
                conn.execute_batch("INSERT INTO profiles (id, email, body) VALUES ('1', 'a@b.com', NULL);")?;
                Ok(())
            })
            .await
            .map_err(DatabaseError::from);

        assert!(matches!(result, Err(DatabaseError::Sqlite(_))));
    }
}
