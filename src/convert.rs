// src/convert.rs
use crate::table::{self, RawFrame};
use anyhow::{bail, Result};
use std::path::Path;
use tracing::info;

/// (input column, SI unit suffix) pairs, in output order. Time is carried
/// through in front of these.
const COLUMN_CONVERSIONS: [(&str, &str); 6] = [
    ("Temperature (°F)", "°C"),
    ("Dew Point (°F)", "°C"),
    ("Humidity (%)", "%"),
    ("Wind Speed (mph)", "m/s"),
    ("Pressure (in)", "hPa"),
    ("Precipitation (in)", "hPa"),
];

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Strip the outer brackets, commas and quotes from an encoded CSV cell,
/// leaving whitespace-separated values.
pub fn clean_cell(cell: &str) -> String {
    let trimmed = cell.trim();
    let mut chars = trimmed.chars();
    chars.next();
    chars.next_back();
    chars.as_str().replace(',', "").replace('\'', "")
}

/// Parse a cleaned cell into its numeric values.
pub fn parse_values(cleaned: &str) -> Vec<f64> {
    cleaned
        .split_whitespace()
        .filter_map(|v| v.parse().ok())
        .collect()
}

pub fn to_celsius(fahrenheit: f64) -> f64 {
    round2(5.0 / 9.0 * (fahrenheit - 32.0))
}

/// Wind speed conversion as shipped: only rounds. The mph -> m/s factor was
/// never applied in the original pipeline and the output contract depends on
/// the values staying put, so this stays a rounding pass. Pressure and
/// precipitation are routed through here too, mirroring the source.
pub fn to_mps(mph: f64) -> f64 {
    round2(mph)
}

/// Inches of mercury to hectoPascal. Present but not wired into the
/// conversion pass; see [`to_mps`].
pub fn to_hpa(inches: f64) -> f64 {
    round2(inches * 33.8639)
}

/// Rename a unit-suffixed column: `Temperature (°F)` + `°C` ->
/// `Temperature (°C)`.
pub fn si_column_name(old: &str, new_unit: &str) -> String {
    let base = old.split(" (").next().unwrap_or(old);
    format!("{} ({})", base, new_unit)
}

fn convert_column(name: &str, cells: &[String]) -> Result<(String, Vec<String>)> {
    let convert: fn(f64) -> f64 = match name {
        "Temperature (°F)" | "Dew Point (°F)" => to_celsius,
        "Wind Speed (mph)" | "Pressure (in)" | "Precipitation (in)" => to_mps,
        // Humidity is already SI; it is still re-encoded like the rest.
        "Humidity (%)" => round2,
        _ => bail!("Unsupported unit for column: {}", name),
    };

    let (_, unit) = COLUMN_CONVERSIONS
        .iter()
        .find(|(col, _)| *col == name)
        .expect("matched above");

    let mut out = Vec::with_capacity(cells.len());
    for (i, cell) in cells.iter().enumerate() {
        if i == 0 {
            // Leading Max/Avg/Min label row passes through untouched.
            out.push(cell.clone());
            continue;
        }
        let values: Vec<String> = parse_values(&clean_cell(cell))
            .into_iter()
            .map(|v| convert(v).to_string())
            .collect();
        out.push(format!("[{}]", values.join(", ")));
    }

    Ok((si_column_name(name, unit), out))
}

/// Convert a scraped month frame to SI units.
///
/// Row 0 of every block (the label row) is copied verbatim; the remaining
/// rows are cleaned, parsed and converted per column. An input frame missing
/// one of the expected columns aborts the pass.
pub fn convert_frame(frame: &RawFrame) -> Result<RawFrame> {
    let mut headers = Vec::with_capacity(7);
    let mut columns = Vec::with_capacity(7);

    let time = frame
        .column("Time")
        .ok_or_else(|| anyhow::anyhow!("input frame has no 'Time' column"))?;
    headers.push("Time".to_string());
    columns.push(time.to_vec());

    for (name, _) in &COLUMN_CONVERSIONS {
        let cells = match frame.column(name) {
            Some(c) => c,
            None => bail!("Unsupported unit for column: {}", name),
        };
        let (new_name, converted) = convert_column(name, cells)?;
        headers.push(new_name);
        columns.push(converted);
    }

    Ok(RawFrame { headers, columns })
}

fn write_frame(frame: &RawFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(&frame.headers)?;
    let rows = frame.columns.iter().map(Vec::len).max().unwrap_or(0);
    for r in 0..rows {
        let record: Vec<&str> = frame
            .columns
            .iter()
            .map(|c| c.get(r).map(String::as_str).unwrap_or_default())
            .collect();
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read `month_data/{file}`, convert to SI and write
/// `si_month_data/SI_{file}`. An existing output file is left alone unless
/// `overwrite` is set. Returns the converted frame, or `None` when the input
/// CSV could not be read.
pub fn si_frame(file: &str, overwrite: bool) -> Result<Option<RawFrame>> {
    si_frame_in(Path::new("."), file, overwrite)
}

fn si_frame_in(root: &Path, file: &str, overwrite: bool) -> Result<Option<RawFrame>> {
    let input = root.join("month_data").join(file);
    let frame = match table::read_csv(&input) {
        Some(f) => f,
        None => return Ok(None),
    };

    let converted = convert_frame(&frame)?;

    let output = root.join("si_month_data").join(format!("SI_{}", file));
    if output.exists() && !overwrite {
        info!("{} exists; skipping (pass --overwrite to replace)", output.display());
    } else {
        write_frame(&converted, &output)?;
        info!("Saved converted data to {}", output.display());
    }

    Ok(Some(converted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn fahrenheit_fixed_points() {
        assert_eq!(to_celsius(32.0), 0.0);
        assert_eq!(to_celsius(212.0), 100.0);
        assert_eq!(to_celsius(82.0), 27.78);
    }

    #[test]
    fn to_mps_only_rounds() {
        assert_eq!(to_mps(10.0), 10.0);
        assert_eq!(to_mps(29.917), 29.92);
    }

    #[test]
    fn to_hpa_applies_factor() {
        assert_eq!(to_hpa(1.0), 33.86);
        assert_eq!(to_hpa(29.92), 1013.21);
    }

    #[test]
    fn cleans_and_parses_encoded_cells() {
        let cleaned = clean_cell("['82', '75', '68']");
        assert_eq!(cleaned, "82 75 68");
        assert_eq!(parse_values(&cleaned), vec![82.0, 75.0, 68.0]);

        // Converted cells come back without quotes.
        assert_eq!(parse_values(&clean_cell("[27.78, 23.89, 20]")), vec![
            27.78, 23.89, 20.0
        ]);
    }

    #[test]
    fn si_column_names() {
        assert_eq!(si_column_name("Temperature (°F)", "°C"), "Temperature (°C)");
        assert_eq!(si_column_name("Humidity (%)", "%"), "Humidity (%)");
    }

    fn frame_with(temp: &str) -> RawFrame {
        let label = "['Max', 'Avg', 'Min']".to_string();
        let mk = |cell: &str| vec![label.clone(), cell.to_string()];
        RawFrame {
            headers: crate::table::COLUMNS.iter().map(|s| s.to_string()).collect(),
            columns: vec![
                vec!["['May']".to_string(), "['1']".to_string()],
                mk(temp),
                mk("['68', '59', '50']"),
                mk("['80', '60', '40']"),
                mk("['12', '7', '2']"),
                mk("['29.92', '29.85', '29.8']"),
                mk("['0.1', '0.05', '0']"),
            ],
        }
    }

    #[test]
    fn converts_frame_to_si() {
        let si = convert_frame(&frame_with("['82', '75', '68']")).unwrap();
        assert_eq!(
            si.headers,
            vec![
                "Time",
                "Temperature (°C)",
                "Dew Point (°C)",
                "Humidity (%)",
                "Wind Speed (m/s)",
                "Pressure (hPa)",
                "Precipitation (hPa)",
            ]
        );
        // Label rows untouched, Time verbatim.
        assert_eq!(si.columns[0], vec!["['May']", "['1']"]);
        assert_eq!(si.columns[1][0], "['Max', 'Avg', 'Min']");
        // Fahrenheit converted; wind/pressure only rounded.
        assert_eq!(si.columns[1][1], "[27.78, 23.89, 20]");
        assert_eq!(si.columns[4][1], "[12, 7, 2]");
        assert_eq!(si.columns[5][1], "[29.92, 29.85, 29.8]");
    }

    #[test]
    fn missing_column_aborts() {
        let mut frame = frame_with("['82', '75', '68']");
        frame.headers[1] = "Temperature (K)".to_string();
        let err = convert_frame(&frame).unwrap_err();
        assert!(err.to_string().contains("Unsupported unit"));
    }

    #[test]
    fn si_frame_reads_converts_and_writes() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        let frame = frame_with("['82', '75', '68']");
        super::write_frame(&frame, &root.join("month_data/spata_venizelos_2024_5.csv")).unwrap();

        let converted = si_frame_in(root, "spata_venizelos_2024_5.csv", false)
            .unwrap()
            .unwrap();
        assert_eq!(converted.columns[1][1], "[27.78, 23.89, 20]");
        assert!(root.join("si_month_data/SI_spata_venizelos_2024_5.csv").exists());

        // Missing input is a handled None, not an error.
        assert!(si_frame_in(root, "no_such.csv", false).unwrap().is_none());
    }
}
