//! Connection helpers.
//!
//! URLs starting with `postgres://` or `postgresql://` open a PostgreSQL
//! connection (requires the `postgres` feature). Anything else is treated as a
//! SQLite database path, optionally prefixed with `sqlite:` or `sqlite://`.

#[cfg(feature = "postgres")]
use diesel::PgConnection;
use diesel::{Connection, RunQueryDsl, SqliteConnection, sql_query};

use crate::error::{StoreError, StoreResult};

/// A live connection to one of the supported backends.
pub enum StoreConnection {
    /// Local SQLite file.
    Sqlite(SqliteConnection),
    /// PostgreSQL server.
    #[cfg(feature = "postgres")]
    Postgres(PgConnection),
}

/// Backend selected by a database URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// SQLite file database.
    Sqlite,
    /// PostgreSQL server.
    Postgres,
}

/// Classifies `database_url` and returns the backend plus the URL the driver expects.
pub fn resolve_url(database_url: &str) -> (Backend, &str) {
    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        (Backend::Postgres, database_url)
    } else if let Some(path) = database_url.strip_prefix("sqlite://") {
        (Backend::Sqlite, path)
    } else if let Some(path) = database_url.strip_prefix("sqlite:") {
        (Backend::Sqlite, path)
    } else {
        (Backend::Sqlite, database_url)
    }
}

impl StoreConnection {
    /// Opens a connection for `database_url`.
    pub fn establish(database_url: &str) -> StoreResult<Self> {
        match resolve_url(database_url) {
            (Backend::Sqlite, path) => Ok(Self::Sqlite(connect_sqlite(path)?)),
            #[cfg(feature = "postgres")]
            (Backend::Postgres, url) => Ok(Self::Postgres(PgConnection::establish(url)?)),
            #[cfg(not(feature = "postgres"))]
            (Backend::Postgres, _) => Err(StoreError::UnsupportedUrl(
                "PostgreSQL support requires the `postgres` feature".to_string(),
            )),
        }
    }

    /// Which backend this connection talks to.
    pub fn backend(&self) -> Backend {
        match self {
            Self::Sqlite(_) => Backend::Sqlite,
            #[cfg(feature = "postgres")]
            Self::Postgres(_) => Backend::Postgres,
        }
    }
}

/// Open a SQLite connection and apply connection-wide PRAGMAs.
pub fn connect_sqlite(path: &str) -> StoreResult<SqliteConnection> {
    if path.is_empty() {
        return Err(StoreError::UnsupportedUrl("empty SQLite path".to_string()));
    }
    let mut conn = SqliteConnection::establish(path)?;

    // Better read concurrency, and the busy timeout covers concurrent writers.
    sql_query("PRAGMA journal_mode=WAL;").execute(&mut conn)?;
    sql_query("PRAGMA foreign_keys=ON;").execute(&mut conn)?;
    sql_query("PRAGMA busy_timeout=5000;").execute(&mut conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_prefixes_select_backend() {
        assert_eq!(resolve_url("postgres://u@h/db"), (Backend::Postgres, "postgres://u@h/db"));
        assert_eq!(resolve_url("postgresql://u@h/db").0, Backend::Postgres);
        assert_eq!(resolve_url("sqlite:///tmp/a.db"), (Backend::Sqlite, "/tmp/a.db"));
        assert_eq!(resolve_url("sqlite:coins.db"), (Backend::Sqlite, "coins.db"));
        assert_eq!(resolve_url("coins.db"), (Backend::Sqlite, "coins.db"));
    }

    #[test]
    fn empty_sqlite_path_is_rejected() {
        assert!(matches!(
            StoreConnection::establish("sqlite:"),
            Err(StoreError::UnsupportedUrl(_))
        ));
    }

    #[cfg(not(feature = "postgres"))]
    #[test]
    fn postgres_url_without_feature_is_unsupported() {
        assert!(matches!(
            StoreConnection::establish("postgres://localhost/coins"),
            Err(StoreError::UnsupportedUrl(_))
        ));
    }
}
