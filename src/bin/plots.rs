// src/bin/plots.rs
use anyhow::{bail, Result};
use chrono::NaiveDate;
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};
use wxscraper::{convert, dates, viz};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let file = match std::env::args().nth(1) {
        Some(f) => f,
        None => bail!("usage: plots <file.csv>"),
    };

    // Convert on the fly; an existing SI file on disk is left untouched.
    let Some(frame) = convert::si_frame(&file, false)? else {
        bail!("could not read '{}'", file);
    };

    let (month, year) = dates::extract_month_year(&file)?;
    let month_dates = dates::generate_dates(month, year);
    let month_name = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%B").to_string())
        .unwrap_or_default();

    let stem = Path::new(&file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("weather");
    viz::multi_histogram(&frame, format!("plots/{}_histograms.png", stem))?;
    viz::high_low_chart(
        &frame,
        &month_dates,
        &month_name,
        year,
        format!("plots/{}_high_low.png", stem),
    )?;

    Ok(())
}
