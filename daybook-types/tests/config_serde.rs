use daybook_types::{
    Anchor, BatchConfig, DaybookError, DecomposeConfig, HeadPolicy, Observation, Record,
    Reduction, TailPolicy,
};
use chrono::NaiveDate;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn batch_config_roundtrip_preserves_layout() {
    let cfg = BatchConfig::new()
        .first_day_of_batch(2)
        .n_elements(5)
        .on_last_day()
        .tails(TailPolicy::Drop)
        .head(HeadPolicy::Drop);

    let json = serde_json::to_string(&cfg).expect("serialize config");
    let de: BatchConfig = serde_json::from_str(&json).expect("deserialize config");

    assert_eq!(de, cfg);
    assert_eq!(de.anchor, Anchor::LastDay);
    assert_eq!(de.n_elements, Some(5));
    assert!(de.validate().is_ok());
}

#[test]
fn batch_config_defaults_take_whole_periods() {
    let cfg = BatchConfig::default();
    assert_eq!(cfg.first_day_of_batch, 0);
    assert_eq!(cfg.n_elements, None);
    assert_eq!(cfg.anchor, Anchor::FirstDay);
    assert_eq!(cfg.tails, TailPolicy::Keep);
    assert_eq!(cfg.head, HeadPolicy::Keep);
}

#[test]
fn batch_config_rejects_negative_offset_and_empty_window() {
    let neg = BatchConfig::new().first_day_of_batch(-1);
    assert!(matches!(neg.validate(), Err(DaybookError::Configuration(_))));

    let zero = BatchConfig::new().n_elements(0);
    assert!(matches!(zero.validate(), Err(DaybookError::Configuration(_))));
}

#[test]
fn reduction_policies() {
    let v = [1.0, 4.0, 2.0];
    assert_eq!(Reduction::Sum.apply(&v), 7.0);
    assert_eq!(Reduction::Max.apply(&v), 4.0);
    assert_eq!(Reduction::Min.apply(&v), 1.0);
    assert_eq!(Reduction::First.apply(&v), 1.0);
    assert_eq!(Reduction::Last.apply(&v), 2.0);
    assert_eq!(Reduction::Count.apply(&v), 3.0);
    assert!((Reduction::Mean.apply(&v) - 7.0 / 3.0).abs() < 1e-12);

    assert_eq!(Reduction::Sum.apply(&[]), 0.0);
    assert!(Reduction::Mean.apply(&[]).is_nan());
    assert!(Reduction::First.apply(&[]).is_nan());
}

#[test]
fn reduction_serializes_as_variant_name() {
    let json = serde_json::to_string(&Reduction::Mean).unwrap();
    assert_eq!(json, "\"Mean\"");
    let back: Reduction = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Reduction::Mean);
}

#[test]
fn decompose_config_defaults_and_labels() {
    let cfg = DecomposeConfig::new("sales");
    assert_eq!(cfg.window_size, 12);
    assert_eq!(cfg.trend_label, "trend");
    assert_eq!(cfg.seasonality_label, "seasonality");

    let cfg = cfg.window_size(4).labels("t", "s");
    let json = serde_json::to_string(&cfg).unwrap();
    let back: DecomposeConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.trend_label, "t");
    assert_eq!(back.seasonality_label, "s");
    assert_eq!(back.window_size, 4);
}

#[test]
fn record_roundtrip_keeps_day_and_fields() {
    let rec = Record::from_pairs(d(2022, 4, 16), [("a", 1.0), ("b", 8.0)]);
    let json = serde_json::to_string(&rec).unwrap();
    assert!(json.contains("2022-04-16"));
    let back: Record = serde_json::from_str(&json).unwrap();
    assert_eq!(back, rec);
    assert_eq!(back.value("b"), Some(8.0));
    assert!(Record::empty(d(2022, 4, 16)).is_empty());
}

#[test]
fn observation_and_error_roundtrip() {
    let obs = Observation::new(d(2020, 1, 1), "a", 3.5);
    let back: Observation = serde_json::from_str(&serde_json::to_string(&obs).unwrap()).unwrap();
    assert_eq!(back, obs);

    let err = DaybookError::out_of_range(31, 30, "days of 2022-04");
    let back: DaybookError =
        serde_json::from_str(&serde_json::to_string(&err).unwrap()).unwrap();
    assert_eq!(back, err);
    assert!(!err.is_absence());
    assert!(DaybookError::not_found("record for 2020-01-01").is_absence());
}

#[test]
fn shared_fields_conflict_lists_names() {
    let err = DaybookError::shared_fields(["a", "c"]);
    match err {
        DaybookError::Conflict { what } => assert!(what.contains("[a, c]")),
        other => panic!("unexpected error: {other:?}"),
    }
}
