// src/viz.rs
use crate::{convert, table::RawFrame};
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::path::Path;
use tracing::info;

const HISTOGRAM_BINS: usize = 15;

/// One SI measurement column split into its daily high/avg/low series.
/// The leading label row is skipped; short or unparsable cells are ignored.
#[derive(Debug, Default, PartialEq)]
pub struct SiSeries {
    pub high: Vec<f64>,
    pub avg: Vec<f64>,
    pub low: Vec<f64>,
}

pub fn split_series(cells: &[String]) -> SiSeries {
    let mut series = SiSeries::default();
    for cell in cells.iter().skip(1) {
        let values = convert::parse_values(&convert::clean_cell(cell));
        if let [high, avg, low] = values[..] {
            series.high.push(high);
            series.avg.push(avg);
            series.low.push(low);
        }
    }
    series
}

fn column_series(frame: &RawFrame, name: &str) -> Result<SiSeries> {
    let cells = frame
        .column(name)
        .with_context(|| format!("column '{}' not present in SI frame", name))?;
    Ok(split_series(cells))
}

/// (bin start, bin end, count) triples over `values`.
fn histogram_bins(values: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    let Some(min) = values.iter().cloned().reduce(f64::min) else {
        return Vec::new();
    };
    let max = values.iter().cloned().reduce(f64::max).unwrap_or(min);
    // Degenerate range: widen so every value lands in one visible bin.
    let (min, max) = if max > min { (min, max) } else { (min - 0.5, min + 0.5) };

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, c)| (min + i as f64 * width, min + (i + 1) as f64 * width, c))
        .collect()
}

/// Gaussian KDE of `values` evaluated on an even grid, scaled so the curve
/// is comparable to histogram counts (density * n * bin width).
fn kde_curve(values: &[f64], bins: usize, points: usize) -> Vec<(f64, f64)> {
    let n = values.len();
    if n < 2 {
        return Vec::new();
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    let std = var.sqrt();
    if std == 0.0 {
        return Vec::new();
    }
    // Silverman's rule of thumb.
    let bandwidth = 1.06 * std * (n as f64).powf(-0.2);

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let bin_width = (max - min) / bins as f64;
    let lo = min - 2.0 * bandwidth;
    let hi = max + 2.0 * bandwidth;

    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    (0..points)
        .map(|i| {
            let x = lo + (hi - lo) * i as f64 / (points - 1) as f64;
            let density: f64 = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            (x, density * n as f64 * bin_width)
        })
        .collect()
}

fn draw_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    title: &str,
    values: &[f64],
    kde: bool,
) -> Result<()> {
    let bins = histogram_bins(values, HISTOGRAM_BINS);
    if bins.is_empty() {
        return Ok(());
    }
    let x_min = bins.first().map(|b| b.0).unwrap_or(0.0);
    let x_max = bins.last().map(|b| b.1).unwrap_or(1.0);
    let y_max = bins.iter().map(|b| b.2).max().unwrap_or(1).max(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(28)
        .y_label_area_size(36)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max * 1.1)
        .map_err(|e| anyhow::anyhow!("chart build failed: {}", e))?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(6)
        .y_labels(5)
        .draw()
        .map_err(|e| anyhow::anyhow!("mesh draw failed: {}", e))?;

    chart
        .draw_series(bins.iter().map(|&(x0, x1, count)| {
            let mut bar = Rectangle::new([(x0, 0.0), (x1, count as f64)], BLUE.mix(0.4).filled());
            bar.set_margin(0, 0, 1, 1);
            bar
        }))
        .map_err(|e| anyhow::anyhow!("histogram draw failed: {}", e))?;

    if kde {
        chart
            .draw_series(LineSeries::new(
                kde_curve(values, HISTOGRAM_BINS, 200),
                RGBColor(255, 127, 14).stroke_width(2),
            ))
            .map_err(|e| anyhow::anyhow!("kde draw failed: {}", e))?;
    }

    Ok(())
}

/// 2x2 histogram grid of the monthly averages: temperature, humidity,
/// pressure and dew point, with a KDE curve over the dew point panel.
pub fn multi_histogram(frame: &RawFrame, out: impl AsRef<Path>) -> Result<()> {
    let temp = column_series(frame, "Temperature (°C)")?;
    let humidity = column_series(frame, "Humidity (%)")?;
    let pressure = column_series(frame, "Pressure (hPa)")?;
    let dew = column_series(frame, "Dew Point (°C)")?;

    let out = out.as_ref();
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let root = BitMapBackend::new(out, (1200, 900)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| anyhow::anyhow!("fill failed: {}", e))?;
    let panels = root.split_evenly((2, 2));

    draw_histogram(&panels[0], "Temperature (°C)", &temp.avg, false)?;
    draw_histogram(&panels[1], "Humidity (%)", &humidity.avg, false)?;
    draw_histogram(&panels[2], "Pressure (hPa)", &pressure.avg, false)?;
    draw_histogram(&panels[3], "Dew Point (°C)", &dew.avg, true)?;

    root.present()
        .map_err(|e| anyhow::anyhow!("present failed: {}", e))?;
    info!("wrote {}", out.display());
    Ok(())
}

/// Daily high and low temperatures for one month, with the band between the
/// two series shaded and every fifth date labeled.
pub fn high_low_chart(
    frame: &RawFrame,
    dates: &[String],
    month_name: &str,
    year: i32,
    out: impl AsRef<Path>,
) -> Result<()> {
    let temp = column_series(frame, "Temperature (°C)")?;
    let n = temp.high.len().min(temp.low.len()).min(dates.len());
    if n == 0 {
        anyhow::bail!("no temperature data to plot");
    }

    let y_min = temp.low[..n].iter().cloned().fold(f64::INFINITY, f64::min) - 2.0;
    let y_max = temp.high[..n].iter().cloned().fold(f64::NEG_INFINITY, f64::max) + 2.0;

    let out = out.as_ref();
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let root = BitMapBackend::new(out, (1200, 700)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| anyhow::anyhow!("fill failed: {}", e))?;

    let caption = format!("Daily high and low temperatures, {} {}", month_name, year);
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 28))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(50)
        .build_cartesian_2d(0..(n - 1) as i32, y_min..y_max)
        .map_err(|e| anyhow::anyhow!("chart build failed: {}", e))?;

    chart
        .configure_mesh()
        .x_labels(n / 5 + 1)
        .x_label_formatter(&|i| {
            dates
                .get(*i as usize)
                .cloned()
                .unwrap_or_default()
        })
        .y_desc("Temperature (°C)")
        .draw()
        .map_err(|e| anyhow::anyhow!("mesh draw failed: {}", e))?;

    // Shaded band between the highs and lows.
    let band: Vec<(i32, f64)> = (0..n)
        .map(|i| (i as i32, temp.high[i]))
        .chain((0..n).rev().map(|i| (i as i32, temp.low[i])))
        .collect();
    chart
        .draw_series(std::iter::once(Polygon::new(band, BLUE.mix(0.1))))
        .map_err(|e| anyhow::anyhow!("band draw failed: {}", e))?;

    chart
        .draw_series(LineSeries::new(
            (0..n).map(|i| (i as i32, temp.high[i])),
            RED.mix(0.5).stroke_width(2),
        ))
        .map_err(|e| anyhow::anyhow!("high series draw failed: {}", e))?;
    chart
        .draw_series(LineSeries::new(
            (0..n).map(|i| (i as i32, temp.low[i])),
            BLUE.mix(0.5).stroke_width(2),
        ))
        .map_err(|e| anyhow::anyhow!("low series draw failed: {}", e))?;

    root.present()
        .map_err(|e| anyhow::anyhow!("present failed: {}", e))?;
    info!("wrote {}", out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_cells_into_high_avg_low() {
        let cells = vec![
            "['Max', 'Avg', 'Min']".to_string(),
            "[27.78, 23.89, 20]".to_string(),
            "[26.11, 22.5, 18.89]".to_string(),
            "bogus".to_string(),
        ];
        let series = split_series(&cells);
        assert_eq!(series.high, vec![27.78, 26.11]);
        assert_eq!(series.avg, vec![23.89, 22.5]);
        assert_eq!(series.low, vec![20.0, 18.89]);
    }

    #[test]
    fn histogram_bins_cover_the_range() {
        let values: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let bins = histogram_bins(&values, 15);
        assert_eq!(bins.len(), 15);
        assert_eq!(bins.iter().map(|b| b.2).sum::<usize>(), 30);
        assert_eq!(bins[0].0, 0.0);
        assert!((bins[14].1 - 29.0).abs() < 1e-9);
    }

    #[test]
    fn histogram_handles_constant_values() {
        let bins = histogram_bins(&[5.0, 5.0, 5.0], 15);
        assert_eq!(bins.iter().map(|b| b.2).sum::<usize>(), 3);
    }

    #[test]
    fn kde_peaks_inside_the_data_range() {
        let values: Vec<f64> = (0..50).map(|i| (i % 10) as f64).collect();
        let curve = kde_curve(&values, 15, 400);
        assert!(!curve.is_empty());
        // Curve is positive and peaks somewhere inside the data range.
        assert!(curve.iter().all(|&(_, y)| y >= 0.0));
        let (peak_x, _) = curve
            .iter()
            .cloned()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert!((0.0..=9.0).contains(&peak_x));
    }

    #[test]
    fn kde_of_tiny_samples_is_empty() {
        assert!(kde_curve(&[1.0], 15, 100).is_empty());
        assert!(kde_curve(&[2.0, 2.0], 15, 100).is_empty());
    }
}
