//! Relational store for fetched coin prices.
//!
//! Two tables: `coin_data` keeps one row per coin and day (first write wins) and
//! `coin_month_data` keeps a running min/max price per coin and calendar month.
//! See [`repo::record_day`] for the write path.

#![deny(missing_docs)]

pub mod db;
pub mod error;
#[allow(missing_docs)]
pub mod models;
#[allow(missing_docs)]
pub mod schema;
pub mod repo;

pub use db::connection::StoreConnection;
pub use error::{StoreError, StoreResult};
pub use models::{DayRecord, DayWrite, MonthAggregate, NewDayRecord};
