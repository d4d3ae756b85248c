//! Least Squares Moving Average.
//!
//! Fits value = a + b·t by ordinary least squares over the last `period`
//! values (t = 1 oldest .. period newest) and outputs the fitted value at
//! t = period. Passes the input through until the window is full.

use chrono::NaiveDateTime;

use crate::domain::Observation;
use crate::error::{check_period, IndicatorError};
use crate::indicator::Indicator;
use crate::window::RollingWindow;

pub const MIN_PERIOD: usize = 2;

#[derive(Debug, Clone)]
pub struct LeastSquaresMovingAverage {
    period: usize,
    name: String,
    values: RollingWindow<f64>,
    /// Σt and the OLS denominator n·Σt² - (Σt)², fixed by the period.
    sum_t: f64,
    denominator: f64,
    slope: f64,
    intercept: f64,
    current: Observation,
}

impl LeastSquaresMovingAverage {
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        check_period("lsma", period, MIN_PERIOD)?;
        let n = period as f64;
        let sum_t = n * (n + 1.0) / 2.0;
        let sum_tt = n * (n + 1.0) * (2.0 * n + 1.0) / 6.0;
        Ok(Self {
            period,
            name: format!("lsma_{period}"),
            values: RollingWindow::new(period)?,
            sum_t,
            denominator: n * sum_tt - sum_t * sum_t,
            slope: 0.0,
            intercept: 0.0,
            current: Observation::default(),
        })
    }

    /// Slope of the latest fit, per bar.
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Intercept of the latest fit (value at t = 0).
    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Indicator for LeastSquaresMovingAverage {
    fn name(&self) -> &str {
        &self.name
    }

    fn warm_up_period(&self) -> usize {
        self.period
    }

    fn update(&mut self, time: NaiveDateTime, value: f64) -> f64 {
        self.values.push(value);

        let out = if !self.values.is_full() {
            value
        } else {
            let n = self.period as f64;
            let (mut sum_y, mut sum_ty) = (0.0, 0.0);
            // iter() runs newest first: newest is t = n.
            for (lookback, y) in self.values.iter().enumerate() {
                let t = n - lookback as f64;
                sum_y += y;
                sum_ty += t * y;
            }
            self.slope = (n * sum_ty - self.sum_t * sum_y) / self.denominator;
            self.intercept = (sum_y - self.slope * self.sum_t) / n;
            self.intercept + self.slope * n
        };

        self.current = Observation::new(time, out);
        out
    }

    fn current(&self) -> Observation {
        self.current
    }

    fn samples(&self) -> usize {
        self.values.samples()
    }

    fn reset(&mut self) {
        self.values.reset();
        self.slope = 0.0;
        self.intercept = 0.0;
        self.current = Observation::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, run, t, FIXTURE_EPSILON};

    const PRICES: [f64; 40] = [
        44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03, 45.61,
        46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64, 46.21, 46.25, 45.71, 46.45, 45.78, 45.35,
        44.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13, 43.51, 43.87, 44.02, 44.49, 44.91, 45.33,
        45.70,
    ];

    #[test]
    fn lsma_20_known_values() {
        let expected = [
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.1, 45.42, 45.84, 46.08, 45.89, 46.03,
            45.61, 46.28, 46.28, 46.0, 46.03, 46.41, 46.22, 46.6039, 46.6457, 46.6433, 46.5157,
            46.4493, 46.2899, 46.0799, 45.6443, 45.2839, 44.9906, 44.8094, 44.4173, 43.9333,
            43.5427, 43.3251, 43.214, 43.1371, 43.1789, 43.3586, 43.6187, 43.9023,
        ];
        let mut lsma = LeastSquaresMovingAverage::new(20).unwrap();
        let result = run(&mut lsma, &PRICES);
        for (actual, expected) in result.iter().zip(expected) {
            assert_approx(*actual, expected, FIXTURE_EPSILON);
        }
    }

    #[test]
    fn exact_on_a_straight_line() {
        let mut lsma = LeastSquaresMovingAverage::new(5).unwrap();
        let line: Vec<f64> = (0..12).map(|i| 3.0 + 2.0 * i as f64).collect();
        let out = run(&mut lsma, &line);
        for (actual, expected) in out.iter().zip(&line) {
            assert_approx(*actual, *expected, 1e-9);
        }
        assert_approx(lsma.slope(), 2.0, 1e-12);
    }

    #[test]
    fn passthrough_before_full_and_readiness() {
        let mut lsma = LeastSquaresMovingAverage::new(3).unwrap();
        assert_eq!(lsma.update(t(0), 10.0), 10.0);
        assert_eq!(lsma.update(t(1), 20.0), 20.0);
        assert!(!lsma.is_ready());
        // fit over (1,10) (2,20) (3,0): slope -5, intercept 20, projection 5
        assert_approx(lsma.update(t(2), 0.0), 5.0, 1e-12);
        assert!(lsma.is_ready());
        lsma.reset();
        assert_eq!(lsma.samples(), 0);
    }

    #[test]
    fn rejects_period_below_2() {
        assert!(LeastSquaresMovingAverage::new(1).is_err());
    }
}
