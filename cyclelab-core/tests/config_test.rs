//! Study configuration tests: TOML in, running pipelines out.

use std::io::Write as _;

use chrono::NaiveDate;
use cyclelab_core::indicators::{CyclePeriodConfig, HomodyneConfig, PeriodogramConfig};
use cyclelab_core::{ConfigError, Indicator, StudyConfig};

const STUDY: &str = r#"
[[pipelines]]
name = "trend"
stages = [{ indicator_type = "instantaneous_trend", params = { period = 5 } }]

[[pipelines]]
name = "cycle"

[[pipelines.stages]]
indicator_type = "high_pass"
params = { period = 48 }

[[pipelines.stages]]
indicator_type = "super_smoother"
params = { period = 10 }

[[pipelines.stages]]
indicator_type = "homodyne"
params = { period = 7, smoothing = 0.33 }

[[pipelines]]
name = "oscillator"
stages = [
    { indicator_type = "cyber_cycle", params = { period = 10, alpha = 0.07 } },
    { indicator_type = "inverse_fisher", params = { period = 10 } },
]
"#;

#[test]
fn study_round_trips_through_toml() {
    let study = StudyConfig::from_toml_str(STUDY).unwrap();
    let text = toml::to_string(&study).unwrap();
    let reparsed = StudyConfig::from_toml_str(&text).unwrap();
    assert_eq!(study, reparsed);
}

#[test]
fn study_pipelines_run_over_a_stream() {
    let mut pipelines = StudyConfig::from_toml_str(STUDY)
        .unwrap()
        .build()
        .unwrap();
    let names: Vec<&str> = pipelines.iter().map(|p| p.name()).collect();
    assert_eq!(names, ["trend", "cycle", "oscillator"]);

    let base = NaiveDate::from_ymd_opt(2023, 6, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    for i in 0..120 {
        let time = base + chrono::Duration::minutes(i);
        let value = 100.0 + 5.0 * (i as f64 * 0.3).sin();
        for pipeline in pipelines.iter_mut() {
            let out = pipeline.update(time, value);
            assert!(out.is_finite());
            assert_eq!(pipeline.current().time, time);
        }
    }
    assert!(pipelines.iter().all(|p| p.is_ready()));

    let oscillator = pipelines[2].current().value;
    assert!(oscillator > -1.0 && oscillator < 1.0);
}

#[test]
fn load_reads_file_and_reports_missing_path() {
    let dir = std::env::temp_dir().join(format!("cyclelab-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("study.toml");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(STUDY.as_bytes())
        .unwrap();

    let study = StudyConfig::load(&path).unwrap();
    assert_eq!(study.pipelines.len(), 3);

    let missing = dir.join("absent.toml");
    let err = StudyConfig::load(&missing).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn unknown_indicator_surfaces_at_build() {
    let toml = r#"
[[pipelines]]
name = "x"
stages = [{ indicator_type = "stochastic" }]
"#;
    let study = StudyConfig::from_toml_str(toml).unwrap();
    let err = study.build().err().unwrap();
    assert!(err.to_string().contains("stochastic"), "{err}");
}

#[test]
fn tuning_structs_fill_missing_fields_with_defaults() {
    let cp: CyclePeriodConfig = toml::from_str("median_length = 7").unwrap();
    assert_eq!(cp.median_length, 7);
    assert_eq!(cp.alpha, CyclePeriodConfig::default().alpha);

    let hd: HomodyneConfig = toml::from_str("max_period = 60.0").unwrap();
    assert_eq!(hd.max_period, 60.0);
    assert_eq!(hd.min_period, 6.0);

    let pg: PeriodogramConfig = toml::from_str("").unwrap();
    assert_eq!(pg, PeriodogramConfig::default());
}
