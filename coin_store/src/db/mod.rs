//! Database utilities for connections and schema migrations.
//!
//! This module provides:
//! - [`connection::StoreConnection`], a connection to either SQLite or (with the
//!   `postgres` feature) PostgreSQL, chosen from the database URL. SQLite
//!   connections get WAL, foreign_keys=ON, and a 5000ms busy_timeout.
//! - Embedded Diesel migrations and runners: [`migrate::run_pending`] and
//!   [`migrate::run_all`].
//!
//! Example:
//! ```no_run
//! use coin_store::db::{connection::StoreConnection, migrate};
//!
//! let db_path = std::env::temp_dir().join("coin_store_example.db");
//! let url = db_path.to_str().unwrap();
//! migrate::run_all(url).expect("migrations");
//! let _conn = StoreConnection::establish(url).expect("connect");
//! ```
//!
//! Note: Building with the `postgres` feature requires the system libpq
//! (e.g., libpq-dev on Debian/Ubuntu).

pub mod connection;
pub mod migrate;
