//! Key-value persistence for the expense collection and user preferences.
//!
//! Each key holds a whole JSON document. Writes replace the previous value in
//! full, there are no partial updates.

use std::{fmt::Debug, path::Path, sync::Mutex};

use rusqlite::{Connection, OptionalExtension};

use crate::Error;

/// The key that holds the JSON array of all expenses.
pub const EXPENSES_KEY: &str = "expenses";

/// The key that holds the dark mode preference as a JSON boolean.
pub const DARK_MODE_KEY: &str = "darkMode";

/// A store of string values addressed by string keys.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Get the value stored under `key`, or `None` if nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage could not be read.
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `value` under `key`, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage could not be written.
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;
}

/// A [KeyValueStore] backed by a single SQLite table.
#[derive(Debug)]
pub struct SqliteKeyValueStore {
    connection: Mutex<Connection>,
}

impl SqliteKeyValueStore {
    /// Wrap `connection`, creating the key-value table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [Error::SqlError] if the table could not be created.
    pub fn new(connection: Connection) -> Result<Self, Error> {
        create_key_value_table(&connection)?;

        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Open (or create) the SQLite database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [Error::SqlError] if the database file could not be opened or
    /// the key-value table could not be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let connection = Connection::open(path)?;
        Self::new(connection)
    }
}

fn create_key_value_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS key_value (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        let connection = self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        connection
            .query_row(
                "SELECT value FROM key_value WHERE key = :key",
                &[(":key", key)],
                |row| row.get(0),
            )
            .optional()
            .map_err(Error::from)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let connection = self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        connection.execute(
            "INSERT INTO key_value (key, value) VALUES (:key, :value)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            &[(":key", key), (":value", value)],
        )?;

        Ok(())
    }
}
