// src/bin/eleusis.rs
use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use tracing_subscriber::{fmt, EnvFilter};
use wxscraper::{fetch::Station, scrape_month};

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let year: i32 = prompt("Year: ")?
        .trim()
        .parse()
        .context("year must be an integer")?;
    let month: u32 = prompt("Month: ")?
        .trim()
        .parse()
        .context("month must be an integer 1-12")?;

    scrape_month(Station::Eleusis, year, month).await
}
