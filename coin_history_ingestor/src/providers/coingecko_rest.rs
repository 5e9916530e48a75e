//! Client for the CoinGecko-style `/coins/{id}/history` endpoint.

pub mod provider;

pub use provider::CoinGeckoProvider;
