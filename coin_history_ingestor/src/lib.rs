//! Fetches daily coin price history from a CoinGecko-style API and persists it as
//! JSON files and, optionally, as day records with monthly min/max aggregates.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod errors;
pub mod io;
pub mod models;
pub mod providers;
pub mod requests;
