//! Day-record and month-aggregate repository.
//!
//! ## Write path
//! [`record_day`] runs two statements inside one transaction:
//! 1. `INSERT .. ON CONFLICT (coin, date) DO NOTHING` into `coin_data`.
//! 2. `INSERT .. ON CONFLICT (coin, year, month) DO UPDATE` into `coin_month_data`,
//!    setting `min_price` to the smaller and `max_price` to the larger of the stored
//!    and incoming price.
//!
//! Step 2 runs even when step 1 hit an existing row: the day keeps its first price,
//! but every observed price widens the month bounds. Both statements commit or roll
//! back together. The aggregate is tightened incrementally; it is never recomputed
//! from a scan of `coin_data`.
//!
//! On SQLite the transaction is `BEGIN IMMEDIATE` to reduce `SQLITE_BUSY` surprises.

use chrono::NaiveDate;
use diesel::{prelude::*, sql_types::Double, upsert::excluded};

use crate::{
    db::connection::StoreConnection,
    error::StoreResult,
    models::{DayRecord, DayWrite, MonthAggregate, NewDayRecord, NewMonthAggregate},
    schema::{coin_data, coin_month_data},
};

// SQLite spells the two-argument scalar min/max as MIN/MAX.
diesel::define_sql_function! {
    /// Smaller of two doubles (SQLite `MIN(a, b)`).
    #[sql_name = "MIN"]
    fn scalar_min(a: Double, b: Double) -> Double;
}

diesel::define_sql_function! {
    /// Larger of two doubles (SQLite `MAX(a, b)`).
    #[sql_name = "MAX"]
    fn scalar_max(a: Double, b: Double) -> Double;
}

// PostgreSQL spells them LEAST/GREATEST.
#[cfg(feature = "postgres")]
diesel::define_sql_function! {
    /// Smaller of two doubles (PostgreSQL `LEAST(a, b)`).
    #[sql_name = "LEAST"]
    fn least(a: Double, b: Double) -> Double;
}

#[cfg(feature = "postgres")]
diesel::define_sql_function! {
    /// Larger of two doubles (PostgreSQL `GREATEST(a, b)`).
    #[sql_name = "GREATEST"]
    fn greatest(a: Double, b: Double) -> Double;
}

/// Runs `$body` with `$c` bound to the backend-specific connection.
macro_rules! with_conn {
    ($conn:expr, $c:ident => $body:expr) => {
        match $conn {
            StoreConnection::Sqlite($c) => $body,
            #[cfg(feature = "postgres")]
            StoreConnection::Postgres($c) => $body,
        }
    };
}

/// Inserts the day row, then widens the month row with `$min`/`$max`.
macro_rules! write_day {
    ($c:ident, $day:expr, $min:ident, $max:ident) => {{
        use coin_month_data::dsl as cm;

        let day: &NewDayRecord<'_> = $day;
        let inserted = diesel::insert_into(coin_data::table)
            .values(day)
            .on_conflict((coin_data::coin, coin_data::date))
            .do_nothing()
            .execute($c)?;

        diesel::insert_into(cm::coin_month_data)
            .values(&NewMonthAggregate::seed(day))
            .on_conflict((cm::coin, cm::year, cm::month))
            .do_update()
            .set((
                cm::min_price.eq($min(cm::min_price, excluded(cm::min_price))),
                cm::max_price.eq($max(cm::max_price, excluded(cm::max_price))),
            ))
            .execute($c)?;

        if inserted == 0 {
            Ok::<_, diesel::result::Error>(DayWrite::Duplicate)
        } else {
            Ok(DayWrite::Inserted)
        }
    }};
}

/// Stores one day's price and folds it into the month aggregate, atomically.
///
/// Returns [`DayWrite::Duplicate`] when a row for `(coin, date)` already exists. That
/// row keeps its first price; the month bounds still absorb the new one.
pub fn record_day(conn: &mut StoreConnection, day: &NewDayRecord<'_>) -> StoreResult<DayWrite> {
    let outcome = match conn {
        StoreConnection::Sqlite(c) => c.immediate_transaction::<_, diesel::result::Error, _>(
            |c| write_day!(c, day, scalar_min, scalar_max),
        )?,
        #[cfg(feature = "postgres")]
        StoreConnection::Postgres(c) => c.transaction::<_, diesel::result::Error, _>(|c| {
            write_day!(c, day, least, greatest)
        })?,
    };

    match outcome {
        DayWrite::Inserted => {
            tracing::debug!(coin = day.coin, date = %day.date, price = day.price, "stored day record");
        }
        DayWrite::Duplicate => {
            tracing::debug!(coin = day.coin, date = %day.date, "day record already stored, month bounds updated");
        }
    }
    Ok(outcome)
}

/// Fetches the stored row for `(coin, date)`, if any.
pub fn day_record(
    conn: &mut StoreConnection,
    coin: &str,
    date: NaiveDate,
) -> StoreResult<Option<DayRecord>> {
    let row = with_conn!(conn, c => coin_data::table
        .find((coin, date))
        .select(DayRecord::as_select())
        .first(c)
        .optional())?;
    Ok(row)
}

/// Number of day rows stored for `coin`.
pub fn count_day_records(conn: &mut StoreConnection, coin: &str) -> StoreResult<i64> {
    let n = with_conn!(conn, c => coin_data::table
        .filter(coin_data::coin.eq(coin))
        .count()
        .get_result::<i64>(c))?;
    Ok(n)
}

/// Fetches the aggregate for one coin and calendar month, if any.
pub fn month_aggregate(
    conn: &mut StoreConnection,
    coin: &str,
    year: i32,
    month: u32,
) -> StoreResult<Option<MonthAggregate>> {
    let row = with_conn!(conn, c => coin_month_data::table
        .find((coin, year, month as i32))
        .select(MonthAggregate::as_select())
        .first(c)
        .optional())?;
    Ok(row)
}

/// All month aggregates for `coin`, oldest first.
pub fn month_aggregates(conn: &mut StoreConnection, coin: &str) -> StoreResult<Vec<MonthAggregate>> {
    let rows = with_conn!(conn, c => coin_month_data::table
        .filter(coin_month_data::coin.eq(coin))
        .order((coin_month_data::year.asc(), coin_month_data::month.asc()))
        .select(MonthAggregate::as_select())
        .load(c))?;
    Ok(rows)
}
