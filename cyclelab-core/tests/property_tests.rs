//! Property tests for indicator invariants.
//!
//! Uses proptest to verify:
//! 1. Determinism — two fresh instances fed the same stream agree bit for bit
//! 2. Reset equivalence — reset + replay equals a fresh instance
//! 3. Readiness monotonicity — false before the warm-up, true from it onward
//! 4. Boundedness — Inverse Fisher output stays inside (-1, 1)
//! 5. Rolling window invariants — capacity, eviction order, sample count
//! 6. Pipeline chaining — a pipeline equals feeding stages by hand

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use cyclelab_core::indicators::{
    AutocorrelogramPeriodogram, InverseFisherTransform, PeriodogramConfig,
};
use cyclelab_core::{
    create_indicator, Indicator, IndicatorConfig, Pipeline, RollingWindow, INDICATOR_TYPES,
};

fn t(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::days(i as i64)
}

fn feed(indicator: &mut dyn Indicator, values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| indicator.update(t(i), v))
        .collect()
}

fn build(indicator_type: &str, period: usize) -> Box<dyn Indicator> {
    let mut config = IndicatorConfig::new(indicator_type);
    if indicator_type == "autocorrelogram_periodogram" {
        // keep the spectrum small so each case stays cheap
        config = config
            .with_param("short_period", 6.0)
            .with_param("long_period", (period + 6) as f64);
    } else {
        config = config.with_param("period", period as f64);
    }
    create_indicator(&config).unwrap()
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_prices() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(50.0..150.0_f64, 1..150)
}

fn arb_indicator_type() -> impl Strategy<Value = &'static str> {
    prop::sample::select(INDICATOR_TYPES.to_vec())
}

/// Large enough for every indicator's minimum period.
fn arb_period() -> impl Strategy<Value = usize> {
    7usize..30
}

// ── 1. Determinism ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn identical_streams_give_identical_outputs(
        indicator_type in arb_indicator_type(),
        period in arb_period(),
        prices in arb_prices(),
    ) {
        let a = feed(build(indicator_type, period).as_mut(), &prices);
        let b = feed(build(indicator_type, period).as_mut(), &prices);
        let a_bits: Vec<u64> = a.iter().map(|v| v.to_bits()).collect();
        let b_bits: Vec<u64> = b.iter().map(|v| v.to_bits()).collect();
        prop_assert_eq!(a_bits, b_bits);
        prop_assert!(a.iter().all(|v| v.is_finite()), "{}: non-finite output", indicator_type);
    }
}

// ── 2. Reset Equivalence ─────────────────────────────────────────────

proptest! {
    #[test]
    fn reset_then_replay_matches_fresh_instance(
        indicator_type in arb_indicator_type(),
        period in arb_period(),
        warm in arb_prices(),
        prices in arb_prices(),
    ) {
        let mut used = build(indicator_type, period);
        feed(used.as_mut(), &warm);
        used.reset();
        prop_assert_eq!(used.samples(), 0);
        prop_assert!(!used.is_ready());

        let replayed = feed(used.as_mut(), &prices);
        let fresh = feed(build(indicator_type, period).as_mut(), &prices);
        prop_assert_eq!(replayed, fresh);
    }
}

// ── 3. Readiness Monotonicity ────────────────────────────────────────

proptest! {
    #[test]
    fn readiness_turns_on_at_warm_up_and_stays_on(
        indicator_type in arb_indicator_type(),
        period in arb_period(),
        prices in arb_prices(),
    ) {
        let mut indicator = build(indicator_type, period);
        let k = indicator.warm_up_period();
        prop_assert!(k > 0);
        for (i, &v) in prices.iter().enumerate() {
            indicator.update(t(i), v);
            prop_assert_eq!(indicator.samples(), i + 1);
            prop_assert_eq!(
                indicator.is_ready(),
                i + 1 >= k,
                "{} at update {}",
                indicator_type,
                i + 1
            );
        }
    }
}

// ── 4. Boundedness ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn inverse_fisher_stays_inside_unit_interval(
        period in 2usize..=60,
        prices in arb_prices(),
        spikes in prop::collection::vec((0usize..200, -1.0e3..1.0e3_f64), 0..5),
    ) {
        let mut prices = prices;
        for (at, jump) in spikes {
            if let Some(p) = prices.get_mut(at) {
                *p += jump;
            }
        }
        let mut ift = InverseFisherTransform::new(period).unwrap();
        for (i, &v) in prices.iter().enumerate() {
            let out = ift.update(t(i), v);
            prop_assert!(out > -1.0 && out < 1.0, "bar {}: {}", i, out);
        }
    }

    #[test]
    fn periodogram_output_is_zero_or_in_band(
        prices in prop::collection::vec(50.0..150.0_f64, 40..120),
    ) {
        let config = PeriodogramConfig {
            short_period: 6,
            long_period: 20,
            ..PeriodogramConfig::default()
        };
        let mut acp = AutocorrelogramPeriodogram::with_config(config).unwrap();
        for (i, &v) in prices.iter().enumerate() {
            let out = acp.update(t(i), v);
            prop_assert!(out == 0.0 || (6.0..=20.0).contains(&out), "bar {}: {}", i, out);
        }
    }
}

// ── 5. Rolling Window Invariants ─────────────────────────────────────

proptest! {
    #[test]
    fn window_holds_the_newest_capacity_items(
        capacity in 1usize..20,
        items in prop::collection::vec(-1e6..1e6_f64, 0..60),
    ) {
        let mut window = RollingWindow::new(capacity).unwrap();
        for (n, &x) in items.iter().enumerate() {
            let evicted = window.push(x);
            if n >= capacity {
                prop_assert_eq!(evicted, Some(items[n - capacity]));
                prop_assert_eq!(window.most_recently_removed(), Some(items[n - capacity]));
            } else {
                prop_assert_eq!(evicted, None);
            }
            prop_assert!(window.len() <= window.capacity());
            prop_assert_eq!(window.item(0).unwrap(), x);
        }

        prop_assert_eq!(window.samples(), items.len());
        prop_assert_eq!(window.len(), items.len().min(capacity));
        let newest_first: Vec<f64> = items.iter().rev().take(capacity).copied().collect();
        prop_assert_eq!(window.iter().collect::<Vec<_>>(), newest_first);
        prop_assert!(window.item(window.len()).is_err());
    }
}

// ── 6. Pipeline Chaining ─────────────────────────────────────────────

proptest! {
    #[test]
    fn pipeline_equals_manual_chaining(
        first in arb_indicator_type(),
        second in arb_indicator_type(),
        period in arb_period(),
        prices in arb_prices(),
    ) {
        let mut pipeline = Pipeline::new(
            "chain",
            vec![build(first, period), build(second, period)],
        ).unwrap();
        let mut a = build(first, period);
        let mut b = build(second, period);

        for (i, &v) in prices.iter().enumerate() {
            let expected = b.update(t(i), a.update(t(i), v));
            prop_assert_eq!(pipeline.update(t(i), v), expected);
            prop_assert_eq!(pipeline.is_ready(), a.is_ready() && b.is_ready());
        }
    }
}
