use std::cell::Cell;

use chrono::{Months, NaiveDate};
use daybook_core::{
    Additive, DaybookError, DecomposeConfig, Decomposer, Decomposition, Granularity, Record,
    TimeSeries, add_trend_seasonality, moving_average,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn monthly(values: &[f64]) -> TimeSeries {
    TimeSeries::new(
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let day = d(2020, 1, 1) + Months::new(i as u32);
                Record::empty(day).with_field("y", *v)
            })
            .collect(),
    )
    .unwrap()
}

/// Returns fixed components and remembers the cycle length it was given.
struct Fixed {
    trend: Vec<f64>,
    seasonal: Vec<f64>,
    seen_cycle: Cell<usize>,
}

impl Fixed {
    fn new(trend: Vec<f64>, seasonal: Vec<f64>) -> Self {
        Self {
            trend,
            seasonal,
            seen_cycle: Cell::new(0),
        }
    }
}

impl Decomposer for Fixed {
    fn decompose(&self, _values: &[f64], periods_per_cycle: usize) -> Result<Decomposition, DaybookError> {
        self.seen_cycle.set(periods_per_cycle);
        Ok(Decomposition {
            trend: self.trend.clone(),
            seasonal: self.seasonal.clone(),
        })
    }
}

#[test]
fn moving_average_shrinks_at_the_edges() {
    assert_eq!(
        moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3),
        vec![1.5, 2.0, 3.0, 4.0, 4.5]
    );
    assert_eq!(
        moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 4),
        vec![1.5, 2.0, 2.5, 3.5, 4.0]
    );
    assert_eq!(moving_average(&[1.0, 2.0], 1), vec![1.0, 2.0]);
    assert!(moving_average(&[], 5).is_empty());
    assert_eq!(moving_average(&[2.0, 4.0], 10), vec![3.0, 3.0]);
}

#[test]
fn trend_and_seasonality_are_attached() {
    let ts = monthly(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    let seasonal: Vec<f64> = (0..8).map(|i| if i % 2 == 0 { 1.234 } else { -1.236 }).collect();
    let fixed = Fixed::new(vec![10.0; 8], seasonal);

    let out = add_trend_seasonality(&ts, Granularity::Monthly, &DecomposeConfig::new("y"), &fixed).unwrap();
    assert_eq!(fixed.seen_cycle.get(), 12);
    assert_eq!(out.len(), 8);
    for (i, r) in out.iter().enumerate() {
        assert_eq!(r.value("y"), Some((i + 1) as f64));
        assert_eq!(r.value("trend"), Some(10.0));
        let expected = if i % 2 == 0 { 1.23 } else { -1.24 };
        assert_eq!(r.value("seasonality"), Some(expected));
    }
    // The source is not modified.
    assert!(ts.get(d(2020, 1, 1)).unwrap().value("trend").is_none());
}

#[test]
fn yearly_series_only_get_a_trend() {
    let ts = TimeSeries::new(
        (0..4)
            .map(|i| Record::empty(d(2018 + i, 1, 1)).with_field("y", f64::from(i)))
            .collect(),
    )
    .unwrap();
    let fixed = Fixed::new(vec![1.0; 4], vec![5.0; 4]);
    let cfg = DecomposeConfig::new("y").labels("t", "s");
    let out = add_trend_seasonality(&ts, Granularity::Yearly, &cfg, &fixed).unwrap();
    assert_eq!(fixed.seen_cycle.get(), 1);
    assert!(out.iter().all(|r| r.value("t") == Some(1.0) && r.value("s").is_none()));
}

#[test]
fn undefined_points_are_skipped() {
    let ts = monthly(&[1.0, 2.0, 3.0]);
    let fixed = Fixed::new(vec![f64::NAN, 2.0, 3.0], vec![0.5, f64::NAN, 0.5]);
    let cfg = DecomposeConfig::new("y").window_size(1);
    let out = add_trend_seasonality(&ts, Granularity::Monthly, &cfg, &fixed).unwrap();
    let recs = out.records();
    assert_eq!(recs[0].value("trend"), None);
    assert_eq!(recs[0].value("seasonality"), Some(0.5));
    assert_eq!(recs[1].value("trend"), Some(2.0));
    assert_eq!(recs[1].value("seasonality"), None);
}

#[test]
fn contract_violations_are_data_errors() {
    let ts = monthly(&[1.0, 2.0, 3.0]);
    let short = Fixed::new(vec![1.0; 2], vec![1.0; 3]);
    assert!(matches!(
        add_trend_seasonality(&ts, Granularity::Monthly, &DecomposeConfig::new("y"), &short),
        Err(DaybookError::Data(_))
    ));

    let mut gappy = ts.clone();
    gappy.update([Record::empty(d(2021, 1, 1)).with_field("other", 1.0)]);
    let fixed = Fixed::new(vec![1.0; 4], vec![1.0; 4]);
    assert!(matches!(
        add_trend_seasonality(&gappy, Granularity::Monthly, &DecomposeConfig::new("y"), &fixed),
        Err(DaybookError::Data(_))
    ));

    assert!(matches!(
        add_trend_seasonality(
            &TimeSeries::default(),
            Granularity::Monthly,
            &DecomposeConfig::new("y"),
            &fixed
        ),
        Err(DaybookError::Data(_))
    ));
}

#[test]
fn additive_recovers_trend_and_cycle() {
    let pattern = [1.0, -1.0, 2.0, -2.0];
    let values: Vec<f64> = (0..16)
        .map(|i| 10.0 + 0.5 * i as f64 + pattern[i % 4])
        .collect();
    let parts = Additive.decompose(&values, 4).unwrap();

    // The ends continue the filtered line.
    for (i, t) in parts.trend.iter().enumerate() {
        assert!((t - (10.0 + 0.5 * i as f64)).abs() < 1e-9, "trend[{i}] = {t}");
    }
    for (i, s) in parts.seasonal.iter().enumerate() {
        assert!((s - pattern[i % 4]).abs() < 1e-9);
    }
}

#[test]
fn additive_needs_two_cycles() {
    assert!(matches!(
        Additive.decompose(&[1.0; 7], 4),
        Err(DaybookError::Data(_))
    ));
    let flat = Additive.decompose(&[1.0, 2.0], 1).unwrap();
    assert_eq!(flat.trend, vec![1.0, 2.0]);
    assert_eq!(flat.seasonal, vec![0.0, 0.0]);
}

#[test]
fn additive_plugs_into_the_series_pipeline() {
    let values: Vec<f64> = (0..12).map(|i| f64::from(i % 4) + f64::from(i) / 10.0).collect();
    let ts = TimeSeries::new(
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let day = d(2019, 1, 1) + Months::new(3 * i as u32);
                Record::empty(day).with_field("y", *v)
            })
            .collect(),
    )
    .unwrap();
    let out = add_trend_seasonality(&ts, Granularity::Quarterly, &DecomposeConfig::new("y"), &Additive).unwrap();
    let recs = out.records();
    assert!(recs.iter().all(|r| r.value("trend").is_some()));
    assert!(recs.iter().all(|r| r.value("seasonality").is_some()));
}

#[test]
fn two_years_of_months_all_get_a_trend() {
    let values: Vec<f64> = (0..24)
        .map(|i| 100.0 + f64::from(i) + if i % 12 < 6 { 5.0 } else { -5.0 })
        .collect();
    let ts = monthly(&values);
    let out = add_trend_seasonality(&ts, Granularity::Monthly, &DecomposeConfig::new("y"), &Additive).unwrap();
    assert_eq!(out.len(), 24);
    for r in out.iter() {
        let trend = r.value("trend").unwrap();
        assert!(trend.is_finite());
        assert!((90.0..=130.0).contains(&trend), "{}: {trend}", r.day);
        assert!(r.value("seasonality").is_some());
    }
}

#[test]
fn short_trend_ends_follow_a_fitted_line() {
    // Odd cycle: three filtered points at each end feed the fit.
    let values = [3.0, 0.0, 6.0, 9.0, 6.0, 12.0];
    let parts = Additive.decompose(&values, 3).unwrap();
    assert_eq!(parts.trend.len(), 6);
    assert!(parts.trend.iter().all(|t| t.is_finite()));
    // Filtered: 3, 5, 7, 9 at positions 1..=4, a line of slope 2.
    assert!((parts.trend[0] - 1.0).abs() < 1e-9);
    assert!((parts.trend[5] - 11.0).abs() < 1e-9);
}
