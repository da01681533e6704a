// src/fetch/mod.rs
pub mod driver;

use crate::{
    config,
    dates,
    extract::{self, Row},
};
use anyhow::Result;
use driver::Driver;
use std::time::Duration;
use tracing::{info, warn};

/// Bounded wait for the observation table to render before grabbing the
/// page source. On timeout the run continues with whatever accumulated.
pub const PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

const CHROMEDRIVER_PORT: u16 = 9515;

/// The two airports this scraper knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Station {
    SpataVenizelos,
    Eleusis,
}

impl Station {
    fn slug(&self) -> (&'static str, &'static str) {
        match self {
            Station::SpataVenizelos => ("spata", "LGAV"),
            Station::Eleusis => ("eleusis", "LGEL"),
        }
    }

    /// CSV filename stem convention consumed downstream; the date helpers
    /// recover year and month from fixed offsets in these names.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Station::SpataVenizelos => "spata_venizelos",
            Station::Eleusis => "eleusis",
        }
    }

    pub fn history_url(&self, year: i32, month: u32) -> String {
        let (place, code) = self.slug();
        format!(
            "https://www.wunderground.com/history/monthly/gr/{}/{}/date/{}-{}",
            place, code, year, month
        )
    }
}

/// Fetch one month of observations for a station.
///
/// Resolves the chromedriver path from config (missing path aborts), renders
/// the history page headlessly, waits up to [`PAGE_LOAD_TIMEOUT`] for the
/// observation table, and flattens it. A timeout is a warning, not an error:
/// the pair is still returned with empty rows so downstream degrades to a
/// null table instead of crashing the run.
pub async fn get_weather_data(
    station: Station,
    year: i32,
    month: u32,
) -> Result<(u32, Vec<Row>)> {
    let days_in_month = dates::days_in_month(year, month);

    let chromedriver = config::chromedriver_path(config::CONFIG_FILE)?;
    let driver = Driver::launch(&chromedriver, CHROMEDRIVER_PORT).await?;

    let url = station.history_url(year, month);
    info!(%url, "loading history page");
    driver.goto(&url).await?;

    let mut rows = Vec::new();
    match driver
        .wait_for(extract::OBSERVATION_TABLE_SELECTOR, PAGE_LOAD_TIMEOUT)
        .await
    {
        Ok(true) => {
            info!("page is ready");
            let html = driver.page_source().await?;
            rows = extract::extract_observation_rows(&html);
        }
        Ok(false) => warn!("loading took too long; continuing with empty data"),
        Err(e) => warn!("readiness poll failed: {}; continuing with empty data", e),
    }

    driver.quit().await?;
    Ok((days_in_month, rows))
}
