use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use super::params::parse_iso_date;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to an optional TOML config file; environment variables override it
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch one coin's history for a single date
    Fetch {
        /// Date in ISO8601 format (e.g. "2021-01-01")
        #[arg(long, value_parser = parse_iso_date)]
        date: NaiveDate,

        /// Coin id as known to the API (e.g. "bitcoin")
        #[arg(long)]
        coin: String,

        /// Also load the price into the database
        #[arg(long)]
        load_to_db: bool,
    },

    /// Fetch one coin's history for every date in an inclusive range
    BulkFetch {
        /// First date in ISO8601 format (e.g. "2021-01-01")
        #[arg(long, value_parser = parse_iso_date)]
        start_date: NaiveDate,

        /// Last date in ISO8601 format, inclusive (e.g. "2021-01-31")
        #[arg(long, value_parser = parse_iso_date)]
        end_date: NaiveDate,

        /// Coin id as known to the API (e.g. "bitcoin")
        #[arg(long)]
        coin: String,

        /// Dispatch requests in concurrent batches instead of one at a time
        #[arg(long)]
        concurrent: bool,

        /// Skip the request delay between dispatches within a batch
        #[arg(long, requires = "concurrent")]
        unthrottled: bool,

        /// Also load every price into the database
        #[arg(long)]
        load_to_db: bool,
    },
}

impl Commands {
    pub fn load_to_db(&self) -> bool {
        match self {
            Commands::Fetch { load_to_db, .. } | Commands::BulkFetch { load_to_db, .. } => {
                *load_to_db
            }
        }
    }
}
