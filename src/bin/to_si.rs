// src/bin/to_si.rs
use anyhow::{bail, Result};
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};
use wxscraper::convert;

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let mut file = None;
    let mut overwrite = false;
    for arg in std::env::args().skip(1) {
        if arg == "-o" || arg == "--overwrite" {
            overwrite = true;
        } else if file.is_none() {
            file = Some(arg);
        } else {
            bail!("unexpected argument '{}'", arg);
        }
    }
    let Some(file) = file else {
        bail!("usage: to_si <file.csv> [-o | --overwrite]");
    };

    if convert::si_frame(&file, overwrite)?.is_none() {
        error!("could not read '{}'; nothing converted", file);
        std::process::exit(1);
    }
    Ok(())
}
