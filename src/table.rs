// src/table.rs
use crate::extract::{Cell, Row};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::{fs::File, path::Path};
use tracing::error;

/// Column headers of the scraped month CSV, in block order. The reshaper
/// assigns extracted rows to these purely by position.
pub const COLUMNS: [&str; 7] = [
    "Time",
    "Temperature (°F)",
    "Dew Point (°F)",
    "Humidity (%)",
    "Wind Speed (mph)",
    "Pressure (in)",
    "Precipitation (in)",
];

/// A reshaped month of observations: seven named columns, each holding
/// `days_in_month + 1` extracted rows (one leading label row per block).
#[derive(Debug)]
pub struct WeatherTable {
    pub columns: Vec<(String, Vec<Row>)>,
}

/// Slice the flattened row sequence into seven consecutive blocks of
/// `days_in_month + 1` rows each and name them in the fixed column order.
///
/// There is no delimiter in the data; correctness depends on the extractor
/// producing exactly `7 * (days_in_month + 1)` rows in order. Short input
/// truncates the trailing blocks silently. Empty input yields `None`.
pub fn reshape(days_in_month: u32, rows: Vec<Row>) -> Option<WeatherTable> {
    if rows.is_empty() {
        return None;
    }

    let days = days_in_month as usize + 1;
    let columns = COLUMNS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let block: Vec<Row> = rows
                .iter()
                .skip(i * days)
                .take(days)
                .cloned()
                .collect();
            (name.to_string(), block)
        })
        .collect();

    Some(WeatherTable { columns })
}

/// Encode one extracted row for a single CSV cell.
///
/// The bracketed form (`['82', '75', '68']`) is the on-disk contract the SI
/// converter's cleaning step parses back; nested rows nest their brackets.
pub fn encode_row(row: &Row) -> String {
    let parts: Vec<String> = row.iter().map(encode_cell).collect();
    format!("[{}]", parts.join(", "))
}

fn encode_cell(cell: &Cell) -> String {
    match cell {
        Cell::Text(s) => format!("'{}'", s),
        Cell::Rows(rows) => {
            let inner: Vec<String> = rows
                .iter()
                .map(|r| {
                    let quoted: Vec<String> =
                        r.iter().map(|s| format!("'{}'", s)).collect();
                    format!("[{}]", quoted.join(", "))
                })
                .collect();
            format!("[{}]", inner.join(", "))
        }
    }
}

/// Write the reshaped table to `path`: one header record, then one record
/// per day slot with each field holding an encoded row.
pub fn save_csv(table: &WeatherTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    wtr.write_record(table.columns.iter().map(|(name, _)| name.as_str()))?;

    let rows = table
        .columns
        .iter()
        .map(|(_, block)| block.len())
        .max()
        .unwrap_or(0);
    for r in 0..rows {
        let record: Vec<String> = table
            .columns
            .iter()
            .map(|(_, block)| block.get(r).map(|row| encode_row(row)).unwrap_or_default())
            .collect();
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// A month CSV read back as raw string cells, column-major.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub headers: Vec<String>,
    pub columns: Vec<Vec<String>>,
}

impl RawFrame {
    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.headers
            .iter()
            .position(|h| h == name)
            .map(|i| self.columns[i].as_slice())
    }
}

/// Read a month CSV back into string columns. A missing or unparsable file
/// is logged and yields `None`; the caller must check.
pub fn read_csv(path: impl AsRef<Path>) -> Option<RawFrame> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            error!("Error reading file '{}': {}", path.display(), e);
            return None;
        }
    };

    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);
    let headers: Vec<String> = match rdr.headers() {
        Ok(h) => h.iter().map(|s| s.to_string()).collect(),
        Err(e) => {
            error!("Error reading file '{}': {}", path.display(), e);
            return None;
        }
    };

    let mut columns: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                error!("Error reading file '{}': {}", path.display(), e);
                return None;
            }
        };
        for (i, field) in record.iter().enumerate() {
            if i < columns.len() {
                columns[i].push(field.to_string());
            }
        }
    }

    Some(RawFrame { headers, columns })
}
