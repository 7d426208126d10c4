//! SQLite repository implementation.
//!
//! Implements `AccountRepository` from `accountsync_core::storage` using SQLite.

use async_trait::async_trait;
use tokio_rusqlite::Connection;

use accountsync_core::account::{Account, AccountNumber};
use accountsync_core::storage::{AccountRepository, RepositoryError, Result};

use super::conversions::{devices_to_json, row_to_account};
use super::error::map_tokio_rusqlite_error_with_id;
use super::schema;

/// Helper to wrap rusqlite errors for tokio_rusqlite closures.
fn wrap_err(e: rusqlite::Error) -> tokio_rusqlite::Error {
    tokio_rusqlite::Error::Rusqlite(e)
}

/// SQLite-based repository implementation.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Creates a new repository with a file-based database.
    ///
    /// The database file will be created if it doesn't exist.
    /// Schema tables are created automatically.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Creates a new repository with an in-memory database.
    ///
    /// Useful for testing - data is lost when the connection is dropped.
    pub async fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;

        Self::init_schema(&conn).await?;

        Ok(Self { conn })
    }

    /// Initialize the database schema.
    async fn init_schema(conn: &Connection) -> Result<()> {
        conn.call(|conn| {
            conn.execute_batch(schema::CREATE_TABLES)
                .map_err(wrap_err)?;
            Ok(())
        })
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))
    }

    /// Stores a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::AlreadyExists` if the number is taken.
    pub async fn insert_account(&self, account: &Account) -> Result<()> {
        let number = account.number().to_string();
        let profile_name = account.profile_name().map(str::to_string);
        let access_key = account
            .unidentified_access_key()
            .map(|key| key.as_bytes().to_vec());
        let devices = devices_to_json(account.devices())?;
        let account_id = number.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    schema::INSERT_ACCOUNT,
                    rusqlite::params![number, profile_name, access_key, devices],
                )
                .map_err(wrap_err)?;
                Ok(())
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Account", account_id))
    }
}

#[async_trait]
impl AccountRepository for SqliteRepository {
    async fn get_account(&self, number: &AccountNumber) -> Result<Option<Account>> {
        let number_str = number.to_string();

        self.conn
            .call(move |conn| {
                let mut stmt = conn
                    .prepare(schema::SELECT_ACCOUNT_BY_NUMBER)
                    .map_err(wrap_err)?;
                match stmt.query_row([&number_str], row_to_account) {
                    Ok(account) => Ok(Some(account)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(wrap_err(e)),
                }
            })
            .await
            .map_err(|e| map_tokio_rusqlite_error_with_id(e, "Account", number.to_string()))
    }
}
