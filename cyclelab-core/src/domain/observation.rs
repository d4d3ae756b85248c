//! Observation — a timestamped scalar, the unit every filter consumes and emits.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single `(time, value)` point of a stream.
///
/// `Observation::default()` (epoch, 0.0) is what a filter reports as its
/// current output before it has seen any input.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Observation {
    pub time: NaiveDateTime,
    pub value: f64,
}

impl Observation {
    pub fn new(time: NaiveDateTime, value: f64) -> Self {
        Self { time, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn default_is_epoch_zero() {
        let obs = Observation::default();
        assert_eq!(obs.value, 0.0);
        assert_eq!(obs.time, NaiveDateTime::default());
    }

    #[test]
    fn observation_serialization_roundtrip() {
        let time = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap();
        let obs = Observation::new(time, 101.25);
        let json = serde_json::to_string(&obs).unwrap();
        let deser: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(obs, deser);
    }
}
