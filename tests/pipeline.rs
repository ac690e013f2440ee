use chrono::NaiveDate;
use proptest::prelude::*;

use rusty_eda::data::filter::filtered_indices;
use rusty_eda::data::model::{Field, Schema};
use rusty_eda::{
    category_counts, correlation_matrix, describe, filter, generate, null_counts, EdaError,
    FieldKind, FieldValue, FilterSpec, Profile, RecordGenerator, RecordSet,
};

fn anchored(profile: Profile) -> RecordGenerator {
    RecordGenerator::new(profile).with_today(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
}

#[test]
fn five_seeded_sales_records_have_sequential_ids() {
    let records = generate(5, Some(1)).unwrap();
    let ids: Vec<i64> = records
        .column("id")
        .unwrap()
        .map(|v| match v {
            FieldValue::Integer(i) => *i,
            other => panic!("unexpected id {other:?}"),
        })
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(records.shape(), (5, 8));
}

#[test]
fn zero_records_is_rejected() {
    assert!(matches!(generate(0, Some(1)), Err(EdaError::InvalidArgument(_))));
}

#[test]
fn category_filter_keeps_source_order() {
    let records = anchored(Profile::Sales).generate(200, Some(9)).unwrap();
    let spec = FilterSpec::default().allow("category", ["A"]);
    let idx = filtered_indices(&records, &spec).unwrap();
    assert!(idx.windows(2).all(|w| w[0] < w[1]));

    let expected: Vec<usize> = records
        .column("category")
        .unwrap()
        .enumerate()
        .filter(|(_, v)| v.as_str() == Some("A"))
        .map(|(i, _)| i)
        .collect();
    assert!(!expected.is_empty());
    assert_eq!(idx, expected);

    let only_a = filter(&records, &spec).unwrap();
    assert_eq!(only_a.len(), idx.len());
    assert!(only_a
        .column("category")
        .unwrap()
        .all(|v| v.as_str() == Some("A")));
    for (row, &i) in only_a.records().iter().zip(&idx) {
        assert_eq!(row, &records.records()[i]);
    }
}

#[test]
fn describe_constant_column() {
    let schema = Schema::new(vec![Field::new("age", FieldKind::Integer)]).unwrap();
    let rows = (0..5).map(|_| vec![FieldValue::Integer(30)]).collect();
    let records = RecordSet::new(schema, rows).unwrap();

    let stats = describe(&records);
    let age = stats.numeric("age").unwrap();
    assert_eq!(age.count, 5);
    assert_eq!(age.mean, 30.0);
    assert_eq!(age.std, 0.0);
    assert_eq!(age.min, 30.0);
    assert_eq!(age.max, 30.0);

    let corr = correlation_matrix(&records);
    assert!(corr.get(0, 0).is_nan());
}

#[test]
fn generated_profiles_have_no_missing_values() {
    for profile in Profile::ALL {
        let records = anchored(profile).generate(50, Some(4)).unwrap();
        assert!(null_counts(&records).iter().all(|(_, n)| *n == 0), "{profile}");
    }
}

#[test]
fn every_filter_and_summary_works_on_an_empty_view() {
    let records = generate(40, Some(2)).unwrap();
    let none = filter(&records, &FilterSpec::default().allow("category", Vec::<String>::new()))
        .unwrap();
    assert!(none.is_empty());
    assert_eq!(none.schema().len(), records.schema().len());

    let stats = describe(&none);
    assert_eq!(stats.numeric("sales").unwrap().count, 0);
    assert!(stats.numeric("sales").unwrap().mean.is_nan());
    assert!(category_counts(&none, "category").unwrap().is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn seeded_generation_is_reproducible(count in 1usize..80, seed in any::<u64>()) {
        let generator = anchored(Profile::Sales);
        let a = generator.generate(count, Some(seed)).unwrap();
        let b = generator.generate(count, Some(seed)).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn filtering_never_grows_the_set(
        count in 1usize..120,
        seed in any::<u64>(),
        lo in 18.0f64..70.0,
        width in 0.0f64..60.0,
    ) {
        let records = anchored(Profile::Sales).generate(count, Some(seed)).unwrap();
        let spec = FilterSpec::default().range("age", lo, lo + width);
        let out = filter(&records, &spec).unwrap();
        prop_assert!(out.len() <= records.len());
        for age in out.column("age").unwrap() {
            let age = age.as_f64().unwrap();
            prop_assert!(age >= lo && age <= lo + width);
        }
    }

    #[test]
    fn full_filter_is_identity(count in 1usize..120, seed in any::<u64>()) {
        let records = anchored(Profile::Customer).generate(count, Some(seed)).unwrap();
        let out = filter(&records, &FilterSpec::full(&records)).unwrap();
        prop_assert_eq!(out, records);
    }

    #[test]
    fn category_counts_cover_every_record(count in 1usize..150, seed in any::<u64>()) {
        let records = anchored(Profile::Sales).generate(count, Some(seed)).unwrap();
        let counts = category_counts(&records, "category").unwrap();
        prop_assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), count);
        prop_assert!(counts.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn correlations_stay_in_range(count in 2usize..100, seed in any::<u64>()) {
        let records = anchored(Profile::Sales).generate(count, Some(seed)).unwrap();
        let corr = correlation_matrix(&records);
        for i in 0..corr.len() {
            for j in 0..corr.len() {
                let r = corr.get(i, j);
                prop_assert!(r.is_nan() || (-1.0..=1.0).contains(&r));
                let t = corr.get(j, i);
                prop_assert!((r.is_nan() && t.is_nan()) || r == t);
            }
        }
    }
}
