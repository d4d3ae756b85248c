//! Bar — OHLCV input for indicators that need more than the close.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Observation;

/// OHLCV bar at a single timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Bar whose four prices all equal `price`. Used when only a scalar stream exists.
    pub fn flat(time: NaiveDateTime, price: f64) -> Self {
        Self {
            time,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 0.0,
        }
    }

    /// The close as an `Observation`.
    pub fn observation(&self) -> Observation {
        Observation::new(self.time, self.close)
    }

    /// Returns true if any price field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .any(|p| !p.is_finite())
    }

    /// Basic OHLC sanity check: high >= low, and open/close inside the range.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar() -> Bar {
        Bar {
            time: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar();
        bar.open = f64::NAN;
        assert!(bar.is_void());
        assert!(!bar.is_sane());
    }

    #[test]
    fn infinite_price_is_void() {
        let mut bar = sample_bar();
        bar.high = f64::INFINITY;
        assert!(bar.is_void());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 97.0; // below low
        assert!(!bar.is_sane());
    }

    #[test]
    fn flat_bar_projects_close() {
        let bar = Bar::flat(sample_bar().time, 42.0);
        assert!(bar.is_sane());
        assert_eq!(bar.observation().value, 42.0);
        assert_eq!(bar.low, 42.0);
    }
}
