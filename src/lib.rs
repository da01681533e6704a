// src/lib.rs
pub mod config;
pub mod convert;
pub mod dates;
pub mod extract;
pub mod fetch;
pub mod table;
pub mod viz;

use anyhow::Result;
use fetch::Station;
use std::path::Path;
use tracing::info;

/// Scrape one month of observations for a station and persist the reshaped
/// table under `month_data/`. A page that produced no rows is not an error;
/// it just saves nothing.
pub async fn scrape_month(station: Station, year: i32, month: u32) -> Result<()> {
    let (days_in_month, rows) = fetch::get_weather_data(station, year, month).await?;

    match table::reshape(days_in_month, rows) {
        Some(weather) => {
            let filename = format!("{}_{}_{}.csv", station.file_prefix(), year, month);
            let path = Path::new("month_data").join(&filename);
            table::save_csv(&weather, &path)?;
            info!("saved {}", path.display());
        }
        None => info!("no observation data found; nothing saved"),
    }

    Ok(())
}
