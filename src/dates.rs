// src/dates.rs
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};

/// Recover (month, year) from a month CSV filename.
///
/// The contract is positional: `spata_venizelos_{year}_{month}.csv` puts the
/// year at chars 16..20 and the month between char 21 and the `.csv` suffix.
/// Any rename breaks this; malformed names yield an error, never a panic.
pub fn extract_month_year(filename: &str) -> Result<(u32, i32)> {
    let err = || format!("Wrong file name format: '{}'", filename);

    let year: i32 = filename
        .get(16..20)
        .and_then(|s| s.parse().ok())
        .with_context(err)?;
    let month: u32 = filename
        .len()
        .checked_sub(4)
        .and_then(|end| filename.get(21..end))
        .and_then(|s| s.parse().ok())
        .with_context(err)?;

    Ok((month, year))
}

/// ISO `YYYY-MM-DD` strings for every day of the given month.
pub fn generate_dates(month: u32, year: i32) -> Vec<String> {
    let mut dates = Vec::new();
    let Some(mut d) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return dates;
    };
    while d.month() == month {
        dates.push(d.format("%Y-%m-%d").to_string());
        match d.succ_opt() {
            Some(next) => d = next,
            None => break,
        }
    }
    dates
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    generate_dates(month, year).len() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_month_and_year_from_filename() {
        assert_eq!(
            extract_month_year("spata_venizelos_2024_5.csv").unwrap(),
            (5, 2024)
        );
        assert_eq!(
            extract_month_year("spata_venizelos_2023_12.csv").unwrap(),
            (12, 2023)
        );
    }

    #[test]
    fn malformed_filename_is_a_handled_error() {
        assert!(extract_month_year("weather.csv").is_err());
        assert!(extract_month_year("").is_err());
        // The offsets hard-code the spata prefix; other prefixes don't fit.
        assert!(extract_month_year("eleusis_2024_5.csv").is_err());
    }

    #[test]
    fn leap_february_has_29_dates() {
        let dates = generate_dates(2, 2024);
        assert_eq!(dates.len(), 29);
        assert_eq!(dates.first().unwrap(), "2024-02-01");
        assert_eq!(dates.last().unwrap(), "2024-02-29");
    }

    #[test]
    fn days_in_month_spans_28_to_31() {
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 5), 31);
    }
}
