//! Insertable/Queryable structs for the coin tables.

use chrono::{Datelike, NaiveDate};
use diesel::prelude::*;

use crate::schema::{coin_data, coin_month_data};

/// One day's price for one coin, borrowed from the fetched payload.
#[derive(Insertable, Debug, Clone, Copy)]
#[diesel(table_name = coin_data)]
pub struct NewDayRecord<'a> {
    pub coin: &'a str,
    pub date: NaiveDate,
    pub price: f64,
    /// Raw upstream payload, serialized JSON.
    pub json: &'a str,
}

/// A stored day row.
#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = coin_data)]
pub struct DayRecord {
    pub coin: String,
    pub date: NaiveDate,
    pub price: f64,
    pub json: String,
}

/// Seed row for the month aggregate: a single price is both the min and the max.
#[derive(Insertable, Debug, Clone, Copy)]
#[diesel(table_name = coin_month_data)]
pub(crate) struct NewMonthAggregate<'a> {
    pub(crate) coin: &'a str,
    pub(crate) year: i32,
    pub(crate) month: i32,
    pub(crate) min_price: f64,
    pub(crate) max_price: f64,
}

impl<'a> NewMonthAggregate<'a> {
    pub(crate) fn seed(day: &NewDayRecord<'a>) -> Self {
        Self {
            coin: day.coin,
            year: day.date.year(),
            month: day.date.month() as i32,
            min_price: day.price,
            max_price: day.price,
        }
    }
}

/// A stored month aggregate row.
#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = coin_month_data)]
pub struct MonthAggregate {
    pub coin: String,
    pub year: i32,
    pub month: i32,
    pub min_price: f64,
    pub max_price: f64,
}

/// Outcome of writing one day record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayWrite {
    /// A new day row was stored and the month aggregate was widened.
    Inserted,
    /// A row for this coin and date already existed and kept its price; only the
    /// month bounds took the new price into account.
    Duplicate,
}
