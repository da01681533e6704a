// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};
use tracing::error;

pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Serialize, Deserialize)]
struct Config {
    chromedriver: PathBuf,
}

/// Resolve the chromedriver executable path from `config.json`.
///
/// If the file does not exist yet, prompt on stdin until an existing path is
/// entered and persist it. If the file exists but cannot be parsed or the
/// recorded path has gone missing, this is an error that aborts the run.
pub fn chromedriver_path(config_path: impl AsRef<Path>) -> Result<PathBuf> {
    let config_path = config_path.as_ref();

    if !config_path.exists() {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            print!("Enter the chromedriver executable path: ");
            io::stdout().flush()?;
            let entered = lines
                .next()
                .context("stdin closed before a path was entered")??;
            let candidate = PathBuf::from(entered.trim());
            if candidate.exists() {
                write_config(config_path, &Config { chromedriver: candidate })?;
                break;
            }
            println!("Invalid path. Please enter a valid path to the chromedriver executable.");
        }
    }

    let raw = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read {}", config_path.display()))?;
    let config: Config = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", config_path.display()))?;

    if !config.chromedriver.exists() {
        error!(
            "chromedriver path {} from {} does not exist",
            config.chromedriver.display(),
            config_path.display()
        );
        anyhow::bail!("Error: Executable path is missing.");
    }

    Ok(config.chromedriver)
}

fn write_config(path: &Path, config: &Config) -> Result<()> {
    let body = serde_json::to_string_pretty(config)?;
    std::fs::write(path, body)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
