use chrono::{Datelike, NaiveDate, Weekday};
use daybook_core::calendar::{self, CalendarStep, calendar_by_steps, iso_weekday};
use daybook_core::{DaybookError, Granularity};
use proptest::prelude::*;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn arb_day() -> impl Strategy<Value = NaiveDate> {
    // Roughly 1900-01-01 ..= 2100-12-31
    (693_596i32..767_010).prop_map(|n| NaiveDate::from_num_days_from_ce_opt(n).unwrap())
}

fn arb_granularity() -> impl Strategy<Value = Granularity> {
    prop::sample::select(Granularity::ALL.to_vec())
}

fn arb_weekday() -> impl Strategy<Value = Weekday> {
    (1u8..=7).prop_map(|c| iso_weekday(c).unwrap())
}

proptest! {
    #[test]
    fn period_brackets_its_day(day in arb_day(), g in arb_granularity()) {
        let beg = g.beginning_of(day);
        let end = g.end_of(day);
        prop_assert!(beg <= day && day <= end);
        prop_assert_eq!((end - beg).num_days() + 1, i64::from(g.period_len(day)));
        prop_assert!(g.period_len(day) >= g.min_period_len());
    }

    #[test]
    fn stepping_from_a_beginning_lands_on_a_beginning(day in arb_day(), g in arb_granularity()) {
        let next = g.delta().add_to(g.beginning_of(day)).unwrap();
        prop_assert_eq!(g.beginning_of(next), next);
        prop_assert_eq!(g.beginning_of(next - chrono::Days::new(1)), g.beginning_of(day));
    }

    #[test]
    fn first_available_beginning_is_the_next_boundary(day in arb_day(), g in arb_granularity()) {
        let fab = g.first_available_beginning(day).unwrap();
        prop_assert!(fab >= day);
        prop_assert_eq!(g.beginning_of(fab), fab);
        prop_assert!((fab - day).num_days() < i64::from(g.period_len(day)));
    }

    #[test]
    fn nth_day_edges_match_boundaries(day in arb_day(), g in arb_granularity()) {
        prop_assume!(g != Granularity::Daily);
        prop_assert_eq!(g.nth_day(day, 0).unwrap(), g.beginning_of(day));
        prop_assert_eq!(g.nth_day(day, -1).unwrap(), g.end_of(day));
        let len = i64::from(g.period_len(day));
        prop_assert_eq!(g.nth_day(day, len - 1).unwrap(), g.end_of(day));
        let is_out_of_range = matches!(g.nth_day(day, len), Err(DaybookError::OutOfRange { .. }));
        prop_assert!(is_out_of_range);
    }

    #[test]
    fn nth_weekday_stays_in_period(day in arb_day(), g in arb_granularity(), wd in arb_weekday(), idx in -1i64..4) {
        prop_assume!(g != Granularity::Daily);
        prop_assume!(idx < i64::from(g.min_weekday_occurrences().unwrap()));
        let picked = g.nth_weekday(day, wd, idx).unwrap();
        prop_assert_eq!(picked.weekday(), wd);
        prop_assert_eq!(g.beginning_of(picked), g.beginning_of(day));
    }
}

#[test]
fn nth_day_of_april() {
    let g = Granularity::Monthly;
    assert_eq!(g.nth_day(d(2022, 4, 16), 7).unwrap(), d(2022, 4, 8));
    assert_eq!(g.nth_day(d(2022, 4, 16), -1).unwrap(), d(2022, 4, 30));
    assert!(matches!(
        g.nth_day(d(2022, 4, 16), 30),
        Err(DaybookError::OutOfRange { index: 30, bound: 30, .. })
    ));
    assert!(matches!(
        g.nth_day(d(2022, 4, 16), -2),
        Err(DaybookError::OutOfRange { .. })
    ));
}

#[test]
fn daily_has_no_sub_period_offsets() {
    let day = d(2022, 4, 16);
    assert!(matches!(
        Granularity::Daily.nth_day(day, 0),
        Err(DaybookError::Unsupported { .. })
    ));
    assert!(matches!(
        Granularity::Daily.nth_weekday(day, Weekday::Mon, 0),
        Err(DaybookError::Unsupported { .. })
    ));
    assert_eq!(Granularity::Daily.beginning_of(day), day);
    assert_eq!(Granularity::Daily.end_of(day), day);
}

#[test]
fn boundaries_of_known_periods() {
    let day = d(2020, 1, 1);
    assert_eq!(Granularity::Weekly.beginning_of(day), d(2019, 12, 30));
    assert_eq!(Granularity::Weekly.end_of(day), d(2020, 1, 5));

    let day = d(2022, 5, 17);
    assert_eq!(Granularity::Quarterly.beginning_of(day), d(2022, 4, 1));
    assert_eq!(Granularity::Quarterly.end_of(day), d(2022, 6, 30));
    assert_eq!(Granularity::Quarterly.period_len(day), 91);
    assert_eq!(Granularity::Yearly.end_of(day), d(2022, 12, 31));

    assert_eq!(calendar::last_day_of_month(d(2024, 2, 3)), d(2024, 2, 29));
    assert_eq!(calendar::last_day_of_month(d(1900, 2, 3)), d(1900, 2, 28));
    assert_eq!(calendar::days_of_year(d(2000, 6, 1)), 366);
}

#[test]
fn last_weekday_occurrence() {
    let fridays = calendar::weekdays_of_range(d(2022, 4, 1), d(2022, 4, 30), Weekday::Fri);
    assert_eq!(fridays.len(), 5);
    assert_eq!(
        Granularity::Monthly
            .nth_weekday(d(2022, 4, 10), Weekday::Fri, -1)
            .unwrap(),
        d(2022, 4, 29)
    );
    assert!(matches!(
        Granularity::Monthly.nth_weekday(d(2022, 4, 10), Weekday::Sat, 5),
        Err(DaybookError::OutOfRange { bound: 5, .. })
    ));
}

#[test]
fn monthly_steps_do_not_drift() {
    let days: Vec<_> = calendar_by_steps(d(2022, 1, 31), d(2022, 6, 30), CalendarStep::months(1)).collect();
    assert_eq!(
        days,
        vec![
            d(2022, 1, 31),
            d(2022, 2, 28),
            d(2022, 3, 31),
            d(2022, 4, 30),
            d(2022, 5, 31),
            d(2022, 6, 30),
        ]
    );

    let it = calendar_by_steps(d(2022, 1, 1), d(2022, 1, 3), CalendarStep::days(1));
    assert_eq!(it.clone().count(), 3);
    assert_eq!(it.count(), 3);

    assert_eq!(
        calendar_by_steps(d(2022, 1, 3), d(2022, 1, 1), CalendarStep::days(1)).count(),
        0
    );
    assert_eq!(
        calendar_by_steps(d(2022, 1, 1), d(2022, 1, 3), CalendarStep::days(0)).count(),
        1
    );
}

#[test]
fn periods_per_year_by_granularity() {
    let per_year: Vec<u32> = Granularity::ALL
        .iter()
        .map(|g| g.delta().periods_per_year())
        .collect();
    assert_eq!(per_year, vec![365, 52, 12, 4, 1]);
    assert!((Granularity::Monthly.delta().total_years() - 1.0 / 12.0).abs() < 1e-12);
}

#[test]
fn granularity_text_forms() {
    assert_eq!("M".parse::<Granularity>().unwrap(), Granularity::Monthly);
    assert_eq!("quarterly".parse::<Granularity>().unwrap(), Granularity::Quarterly);
    assert!(matches!(
        "fortnightly".parse::<Granularity>(),
        Err(DaybookError::Configuration(_))
    ));
    assert_eq!(Granularity::Weekly.to_string(), "weekly");
    assert_eq!(serde_json::to_string(&Granularity::Yearly).unwrap(), "\"yearly\"");
    let back: Granularity = serde_json::from_str("\"daily\"").unwrap();
    assert_eq!(back, Granularity::Daily);
}

#[test]
fn iso_weekday_codes() {
    assert_eq!(iso_weekday(1).unwrap(), Weekday::Mon);
    assert_eq!(iso_weekday(7).unwrap(), Weekday::Sun);
    assert!(matches!(iso_weekday(0), Err(DaybookError::Configuration(_))));
    assert!(matches!(iso_weekday(8), Err(DaybookError::Configuration(_))));
}

#[test]
fn weeks_clamp_at_the_calendar_edges() {
    for day in [NaiveDate::MIN, NaiveDate::MAX] {
        let beg = Granularity::Weekly.beginning_of(day);
        let end = Granularity::Weekly.end_of(day);
        assert!(beg <= day && day <= end);
        assert_eq!(
            (end - beg).num_days() + 1,
            i64::from(Granularity::Weekly.period_len(day))
        );
        let len = Granularity::Weekly.period_len(day);
        assert!(len <= 7);
        assert_eq!(Granularity::Weekly.nth_day(day, i64::from(len) - 1).unwrap(), end);
        assert!(matches!(
            Granularity::Weekly.nth_day(day, i64::from(len)),
            Err(DaybookError::OutOfRange { .. })
        ));
    }
    assert_eq!(calendar::first_day_of_week(NaiveDate::MIN), NaiveDate::MIN);
    assert_eq!(calendar::last_day_of_week(NaiveDate::MAX), NaiveDate::MAX);
    assert_eq!(Granularity::Weekly.next_beginning(NaiveDate::MAX), None);
    assert_eq!(Granularity::Yearly.next_beginning(NaiveDate::MAX), None);
    assert_eq!(
        Granularity::Monthly.next_beginning(d(2022, 1, 15)),
        Some(d(2022, 2, 1))
    );
}
