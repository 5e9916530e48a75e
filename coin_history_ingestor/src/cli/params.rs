use chrono::NaiveDate;

use crate::models::job::FetchJob;

/// Parses a calendar date in ISO8601 form (`YYYY-MM-DD`).
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date {raw:?}, expected YYYY-MM-DD: {e}"))
}

/// Renders failed jobs as `coin on date` lines for the end-of-run report.
pub fn describe_failures(failed: &[FetchJob]) -> Vec<String> {
    let mut lines: Vec<String> = failed.iter().map(ToString::to_string).collect();
    lines.sort();
    lines
}
