//! CSV observation loading.
//!
//! Required columns: `time`, `close`. Optional: `open`, `high`, `low`,
//! `volume`; missing prices fall back to the close, missing volume to 0.

use std::io::Read;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use cyclelab_core::Bar;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Row {
    time: String,
    close: f64,
    #[serde(default)]
    open: Option<f64>,
    #[serde(default)]
    high: Option<f64>,
    #[serde(default)]
    low: Option<f64>,
    #[serde(default)]
    volume: Option<f64>,
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_time(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(time) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(time);
        }
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("unrecognized timestamp '{s}'"))?;
    Ok(date.and_time(chrono::NaiveTime::MIN))
}

/// Read bars from CSV, rejecting rows whose time goes backwards and rows
/// whose prices fail `Bar::is_sane`.
pub fn read_bars<R: Read>(reader: R) -> Result<Vec<Bar>> {
    let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut bars: Vec<Bar> = Vec::new();

    for (index, record) in csv.deserialize::<Row>().enumerate() {
        // header is line 1
        let line = index + 2;
        let row = record.with_context(|| format!("line {line}: malformed row"))?;
        let time = parse_time(&row.time).with_context(|| format!("line {line}"))?;

        if let Some(previous) = bars.last() {
            if time < previous.time {
                bail!(
                    "line {line}: time {time} precedes previous row at {}",
                    previous.time
                );
            }
        }
        if !row.close.is_finite() {
            bail!("line {line}: close is not a finite number");
        }

        let bar = Bar {
            time,
            open: row.open.unwrap_or(row.close),
            high: row.high.unwrap_or(row.close),
            low: row.low.unwrap_or(row.close),
            close: row.close,
            volume: row.volume.unwrap_or(0.0),
        };
        if bar.is_void() {
            bail!("line {line}: a price is not a finite number");
        }
        if !bar.is_sane() {
            bail!(
                "line {line}: low {} / high {} do not bracket open {} and close {}",
                bar.low,
                bar.high,
                bar.open,
                bar.close
            );
        }
        bars.push(bar);
    }

    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dates_and_datetimes() {
        let day = parse_time("2024-03-01").unwrap();
        assert_eq!(day.to_string(), "2024-03-01 00:00:00");
        let minute = parse_time("2024-03-01 09:31:00").unwrap();
        assert_eq!(minute.to_string(), "2024-03-01 09:31:00");
        assert_eq!(parse_time("2024-03-01T09:31:00").unwrap(), minute);
        assert!(parse_time("03/01/2024").is_err());
    }

    #[test]
    fn close_only_rows_fill_the_bar() {
        let data = "time,close\n2024-01-02,10.5\n2024-01-03,11\n";
        let bars = read_bars(data.as_bytes()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].low, 10.5);
        assert_eq!(bars[1].close, 11.0);
        assert_eq!(bars[1].volume, 0.0);
    }

    #[test]
    fn full_bars_keep_every_column() {
        let data = "time,open,high,low,close,volume\n2024-01-02,10,12,9,11,500\n";
        let bars = read_bars(data.as_bytes()).unwrap();
        assert_eq!(bars[0].high, 12.0);
        assert_eq!(bars[0].low, 9.0);
        assert_eq!(bars[0].volume, 500.0);
    }

    #[test]
    fn equal_timestamps_are_allowed_but_backwards_is_not() {
        let data = "time,close\n2024-01-02,1\n2024-01-02,2\n";
        assert_eq!(read_bars(data.as_bytes()).unwrap().len(), 2);

        let data = "time,close\n2024-01-03,1\n2024-01-02,2\n";
        let err = read_bars(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");
    }

    #[test]
    fn nan_or_inverted_range_is_rejected_with_line() {
        let data = "time,high,low,close\n2024-01-02,11,9,10\n2024-01-03,12,NaN,11\n";
        let err = read_bars(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");

        let data = "time,high,low,close\n2024-01-02,9,11,10\n";
        let err = read_bars(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
        assert!(err.to_string().contains("bracket"), "{err}");
    }

    #[test]
    fn missing_close_is_an_error() {
        let data = "time,open\n2024-01-02,1\n";
        assert!(read_bars(data.as_bytes()).is_err());
    }
}
